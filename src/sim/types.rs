//! Per-day output records.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Every committed value at the end of one simulated day.
///
/// Labels appear in the order they were first written during the run.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use patient_paths::sim::types::Snapshot;
/// use patient_paths::sim::value::Value;
///
/// let mut values = IndexMap::new();
/// values.insert("admitted".to_string(), Value::from(vec![3.0, 2.0]));
/// let snap = Snapshot::new(0, values);
/// assert_eq!(snap.get("admitted").map(Value::sum), Some(5.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Zero-based day index.
    pub day: usize,
    /// Committed values by label.
    pub values: IndexMap<String, Value>,
}

impl Snapshot {
    pub fn new(day: usize, values: IndexMap<String, Value>) -> Self {
        Self { day, values }
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.values.get(label)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {:>3} |", self.day)?;
        for (label, value) in &self.values {
            write!(f, " {label}={value}")?;
        }
        Ok(())
    }
}
