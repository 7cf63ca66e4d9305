//! Post-hoc run summary computed from daily snapshots.

use std::fmt;

use indexmap::IndexMap;

use super::types::Snapshot;

/// Aggregates for one label, summed over strata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSummary {
    /// Sum over all days.
    pub total: f64,
    /// Largest single-day value.
    pub peak: f64,
    /// Day on which `peak` was first reached.
    pub peak_day: usize,
    /// Value on the last day.
    pub last: f64,
}

/// Per-label totals and peaks over a complete run.
///
/// Computed from the snapshot vector so the summary always agrees with the
/// exported data.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of simulated days.
    pub days: usize,
    /// Aggregates in label-insertion order.
    pub labels: IndexMap<String, LabelSummary>,
}

impl RunSummary {
    /// Summarises a run.
    ///
    /// # Arguments
    ///
    /// * `snapshots` - One snapshot per simulated day, in day order
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        let mut labels: IndexMap<String, LabelSummary> = IndexMap::new();
        for snap in snapshots {
            for (label, value) in &snap.values {
                let x = value.sum();
                labels
                    .entry(label.clone())
                    .and_modify(|s| {
                        s.total += x;
                        if x > s.peak {
                            s.peak = x;
                            s.peak_day = snap.day;
                        }
                        s.last = x;
                    })
                    .or_insert(LabelSummary {
                        total: x,
                        peak: x,
                        peak_day: snap.day,
                        last: x,
                    });
            }
        }
        Self {
            days: snapshots.len(),
            labels,
        }
    }

    pub fn get(&self, label: &str) -> Option<&LabelSummary> {
        self.labels.get(label)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ({} days) ---", self.days)?;
        let width = self.labels.keys().map(String::len).max().unwrap_or(5).max(5);
        writeln!(
            f,
            "{:<width$}  {:>12}  {:>12}  {:>8}  {:>12}",
            "label", "total", "peak", "peak day", "last"
        )?;
        for (label, s) in &self.labels {
            writeln!(
                f,
                "{label:<width$}  {:>12.2}  {:>12.2}  {:>8}  {:>12.2}",
                s.total, s.peak, s.peak_day, s.last
            )?;
        }
        Ok(())
    }
}
