use crate::error::Result;
use crate::sim::store::ValueStore;
use crate::sim::value::Value;

use super::ledger::Ledgers;
use super::params::Params;
use super::types::Component;

/// Collapses a per-stratum vector into its scalar total.
#[derive(Debug, Clone)]
pub struct SumVector {
    from: String,
    to: String,
}

impl SumVector {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["from", "to"])?;
        Ok(Box::new(Self {
            from: params.label("from")?,
            to: params.label("to")?,
        }))
    }
}

impl Component for SumVector {
    fn component_type(&self) -> &'static str {
        "sum_vector"
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.from.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.to.as_str()]
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        let total = values.get(&self.from)?.sum();
        values.add(&self.to, Value::Scalar(total))
    }
}
