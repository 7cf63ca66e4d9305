/// Snapshot export to CSV and JSON lines.
pub mod export;
