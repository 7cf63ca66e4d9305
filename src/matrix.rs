//! Linear label-to-label transition engine.
//!
//! A [`PresentationMatrix`] holds a value per label and a table of weighted
//! transitions. Every [`PresentationMatrix::apply`] recomputes all targets
//! from the previous step's values; nothing carries over implicitly.

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SimError};
use crate::sim::value::Value;

/// Weighted flows between labels, recomputed in full each step.
///
/// # Examples
///
/// ```
/// use patient_paths::matrix::PresentationMatrix;
/// use patient_paths::sim::value::Value;
///
/// let mut m = PresentationMatrix::new(Value::from(0.0));
/// m.transition("mild", "ed", Value::from(0.25));
/// m.set("mild", Value::from(8.0));
/// m.apply().unwrap();
/// assert_eq!(m.get("ed").unwrap(), &Value::from(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct PresentationMatrix {
    values: IndexMap<String, Value>,
    multipliers: IndexMap<String, IndexMap<String, Value>>,
    default: Value,
}

impl PresentationMatrix {
    /// Creates an empty matrix whose untargeted labels reset to `default`.
    pub fn new(default: Value) -> Self {
        Self {
            values: IndexMap::new(),
            multipliers: IndexMap::new(),
            default,
        }
    }

    /// Declares (or replaces) the flow `from -> to` with weight `multiplier`.
    pub fn transition(&mut self, from: &str, to: &str, multiplier: Value) {
        self.multipliers
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), multiplier);
    }

    pub fn set(&mut self, label: &str, value: Value) {
        self.values.insert(label.to_string(), value);
    }

    /// Current value of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UninitializedValue`] for a label never set nor
    /// computed.
    pub fn get(&self, label: &str) -> Result<&Value> {
        self.values
            .get(label)
            .ok_or_else(|| SimError::uninitialized(label))
    }

    /// Labels that receive at least one transition, in declaration order.
    pub fn targets(&self) -> IndexSet<&str> {
        self.multipliers
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Advances one step.
    ///
    /// Every tracked label starts from the default, then each transition
    /// adds `multiplier * old[from]` into its target. On error the matrix is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UninitializedValue`] when a transition source
    /// was never set, and [`SimError::Shape`] for incompatible vectors.
    pub fn apply(&mut self) -> Result<()> {
        let old = &self.values;
        let mut new: IndexMap<String, Value> = old
            .keys()
            .map(|label| (label.clone(), self.default.clone()))
            .collect();
        for (from, row) in &self.multipliers {
            let source = old.get(from).ok_or_else(|| SimError::uninitialized(from))?;
            for (to, multiplier) in row {
                let flow = multiplier.try_mul(source, to)?;
                let slot = new
                    .entry(to.clone())
                    .or_insert_with(|| self.default.clone());
                *slot = slot.try_add(&flow, to)?;
            }
        }
        self.values = new;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_from_previous_step() {
        let mut m = PresentationMatrix::new(Value::from(0.0));
        m.transition("a", "b", Value::from(0.5));
        m.transition("b", "c", Value::from(2.0));
        m.set("a", Value::from(4.0));
        m.set("b", Value::from(1.0));
        m.apply().unwrap();
        // b comes from the old a, c from the old b, a has no inflow.
        assert_eq!(m.get("a").unwrap(), &Value::from(0.0));
        assert_eq!(m.get("b").unwrap(), &Value::from(2.0));
        assert_eq!(m.get("c").unwrap(), &Value::from(2.0));
    }

    #[test]
    fn unset_source_fails_and_leaves_state() {
        let mut m = PresentationMatrix::new(Value::from(0.0));
        m.set("x", Value::from(1.0));
        m.transition("ghost", "x", Value::from(1.0));
        assert_eq!(
            m.apply(),
            Err(SimError::UninitializedValue {
                label: "ghost".into()
            })
        );
        assert_eq!(m.get("x").unwrap(), &Value::from(1.0));
    }

    #[test]
    fn vector_multipliers_are_elementwise() {
        let mut m = PresentationMatrix::new(Value::from(vec![0.0, 0.0]));
        m.transition("mild", "ed", Value::from(vec![0.1, 0.5]));
        m.transition("severe", "ed", Value::from(1.0));
        m.set("mild", Value::from(vec![10.0, 10.0]));
        m.set("severe", Value::from(vec![1.0, 2.0]));
        m.apply().unwrap();
        assert_eq!(m.get("ed").unwrap(), &Value::from(vec![2.0, 7.0]));
        assert_eq!(m.targets().into_iter().collect::<Vec<_>>(), vec!["ed"]);
    }
}
