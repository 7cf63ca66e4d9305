//! Named values with commit-on-day-boundary semantics.

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SimError};

use super::value::{Shape, Value};

/// Current and pending values for every label in a run.
///
/// Component writes land in `pending` and are published to `committed` by
/// [`ValueStore::commit`], once per simulated day. Writes to ordinary labels
/// accumulate (several producers may feed one label); writes to pole labels
/// overwrite.
///
/// Reads see a non-pole label's value from earlier in the same day when one
/// exists, otherwise the last committed value. Pole labels always read the
/// committed value, so a pole written today is observed tomorrow.
///
/// The first write to a label fixes its [`Shape`] for the rest of the run.
///
/// # Examples
///
/// ```
/// use patient_paths::sim::store::ValueStore;
/// use patient_paths::sim::value::Value;
///
/// let mut store = ValueStore::new();
/// store.add("admitted", Value::from(2.0)).unwrap();
/// store.add("admitted", Value::from(3.0)).unwrap();
/// store.commit();
/// assert_eq!(store.get("admitted").unwrap(), &Value::from(5.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    committed: IndexMap<String, Value>,
    pending: IndexMap<String, Value>,
    shapes: IndexMap<String, Shape>,
    poles: IndexSet<String>,
}

impl ValueStore {
    /// Creates an empty store with no pole labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store treating `poles` as externally driven labels.
    pub fn with_poles<I, S>(poles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            poles: poles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether `label` is a pole.
    pub fn is_pole(&self, label: &str) -> bool {
        self.poles.contains(label)
    }

    fn check_shape(&mut self, label: &str, value: &Value) -> Result<()> {
        let found = value.shape();
        match self.shapes.get(label) {
            Some(&expected) if expected != found => Err(SimError::shape(label, expected, found)),
            Some(_) => Ok(()),
            None => {
                self.shapes.insert(label.to_string(), found);
                Ok(())
            }
        }
    }

    /// Overwrites the pending value of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Shape`] if `value` conflicts with the label's shape.
    pub fn set(&mut self, label: &str, value: Value) -> Result<()> {
        self.check_shape(label, &value)?;
        self.pending.insert(label.to_string(), value);
        Ok(())
    }

    /// Accumulates `delta` into the pending value of `label`.
    ///
    /// The first write of the day starts from `delta` itself, not from the
    /// committed value. On a pole label this behaves like [`ValueStore::set`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Shape`] if `delta` conflicts with the label's shape.
    pub fn add(&mut self, label: &str, delta: Value) -> Result<()> {
        if self.is_pole(label) {
            return self.set(label, delta);
        }
        self.check_shape(label, &delta)?;
        match self.pending.get_mut(label) {
            Some(current) => *current = current.try_add(&delta, label)?,
            None => {
                self.pending.insert(label.to_string(), delta);
            }
        }
        Ok(())
    }

    /// Current value of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UninitializedValue`] if the label has never been
    /// committed and has not been written earlier today.
    pub fn get(&self, label: &str) -> Result<&Value> {
        let today = if self.is_pole(label) {
            None
        } else {
            self.pending.get(label)
        };
        if let Some(v) = today {
            return Ok(v);
        }
        self.committed
            .get(label)
            .ok_or_else(|| SimError::uninitialized(label))
    }

    /// Last committed value of `label`, ignoring today's writes.
    pub fn committed(&self, label: &str) -> Option<&Value> {
        self.committed.get(label)
    }

    /// Publishes every pending write and clears the pending buffer.
    ///
    /// Labels not written since the last commit keep their value. New labels
    /// are appended in first-write order.
    pub fn commit(&mut self) {
        for (label, value) in self.pending.drain(..) {
            self.committed.insert(label, value);
        }
    }

    /// Number of writes waiting for the next commit.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Committed values in label-insertion order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.committed
    }
}
