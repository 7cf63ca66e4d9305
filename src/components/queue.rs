use std::collections::VecDeque;

use crate::error::Result;
use crate::sim::store::ValueStore;
use crate::sim::value::Value;

use super::ledger::Ledgers;
use super::params::Params;
use super::types::Component;

/// Fixed-length delay line.
///
/// Each day the oldest slot is emitted as `to` and today's `from` is
/// stored. Until `size` days have been stored, `to` is zero.
/// `queued_out` reports the total currently held in the line.
#[derive(Debug, Clone)]
pub struct Queue {
    from: String,
    to: String,
    queued_out: String,
    size: usize,
    slots: VecDeque<Value>,
}

impl Queue {
    pub fn new(from: &str, to: &str, queued_out: &str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            from: from.to_string(),
            to: to.to_string(),
            queued_out: queued_out.to_string(),
            size,
            slots: VecDeque::new(),
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["from", "to", "queued_out", "size"])?;
        let size = params.count("size")?;
        if size == 0 {
            return Err(params.invalid("size", "must be at least 1").into());
        }
        Ok(Box::new(Self::new(
            &params.label("from")?,
            &params.label("to")?,
            &params.label("queued_out")?,
            size,
        )))
    }

    /// Values held in the line, oldest first.
    pub fn slots(&self) -> &VecDeque<Value> {
        &self.slots
    }
}

impl Component for Queue {
    fn component_type(&self) -> &'static str {
        "queue"
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.from.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.to.as_str(), self.queued_out.as_str()]
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        let incoming = values.get(&self.from)?.clone();
        let outgoing = if self.slots.len() >= self.size {
            self.slots.pop_front()
        } else {
            None
        };
        let outgoing = outgoing.unwrap_or_else(|| Value::zeros(incoming.shape()));
        self.slots.push_back(incoming);

        let held: f64 = self.slots.iter().map(Value::sum).sum();
        values.add(&self.to, outgoing)?;
        values.add(&self.queued_out, Value::Scalar(held))
    }
}
