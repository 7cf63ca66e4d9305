pub mod engine;
/// Dependency graph and execution order.
pub mod graph;
pub mod kpi;
pub mod store;
pub mod types;
pub mod value;
