use crate::error::Result;
use crate::sim::store::ValueStore;
use crate::sim::value::Value;

use super::ledger::Ledgers;
use super::params::{Operand, Params};
use super::types::Component;

/// Writes a sum of products of labels and literals into one output.
///
/// `terms = [["rate", "admitted"], ["backlog"], [0.5, [1, 2], "flow"]]`
/// computes `rate*admitted + backlog + 0.5*[1,2]*flow`.
#[derive(Debug, Clone)]
pub struct Transfer {
    output: String,
    terms: Vec<Vec<Operand>>,
}

impl Transfer {
    pub fn new(output: &str, terms: Vec<Vec<Operand>>) -> Self {
        Self {
            output: output.to_string(),
            terms,
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["output", "terms"])?;
        Ok(Box::new(Self {
            output: params.label("output")?,
            terms: params.terms("terms")?,
        }))
    }

    fn product(&self, factors: &[Operand], values: &ValueStore) -> Result<Value> {
        let mut acc = Value::Scalar(1.0);
        for factor in factors {
            acc = acc.try_mul(&factor.resolve(values)?, &self.output)?;
        }
        Ok(acc)
    }
}

impl Component for Transfer {
    fn component_type(&self) -> &'static str {
        "transfer"
    }

    fn inputs(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.terms.iter().flatten().filter_map(Operand::label) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.output.as_str()]
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        let mut total: Option<Value> = None;
        for factors in &self.terms {
            let p = self.product(factors, values)?;
            total = Some(match total {
                Some(t) => t.try_add(&p, &self.output)?,
                None => p,
            });
        }
        match total {
            Some(t) => values.add(&self.output, t),
            None => Ok(()),
        }
    }
}
