use crate::error::Result;
use crate::matrix::PresentationMatrix;
use crate::sim::store::ValueStore;

use super::ledger::Ledgers;
use super::params::Params;
use super::types::Component;

/// Runs a [`PresentationMatrix`] once per day inside the component graph.
///
/// The listed `inputs` are copied from the store into the matrix before the
/// step; every transition target is added to the store afterwards.
#[derive(Debug, Clone)]
pub struct Presentation {
    matrix: PresentationMatrix,
    inputs: Vec<String>,
    targets: Vec<String>,
}

impl Presentation {
    pub fn new(matrix: PresentationMatrix, inputs: Vec<String>) -> Self {
        let targets = matrix.targets().into_iter().map(str::to_string).collect();
        Self {
            matrix,
            inputs,
            targets,
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["default", "transitions", "inputs"])?;
        let mut matrix = PresentationMatrix::new(params.literal("default")?);
        for table in params.tables("transitions")? {
            let t = params.nested(table);
            t.allow_only(&["from", "to", "multiplier"])?;
            matrix.transition(&t.label("from")?, &t.label("to")?, t.literal("multiplier")?);
        }
        let inputs = if params.raw("inputs").is_ok() {
            params.labels("inputs")?
        } else {
            Vec::new()
        };
        Ok(Box::new(Self::new(matrix, inputs)))
    }
}

impl Component for Presentation {
    fn component_type(&self) -> &'static str {
        "presentation"
    }

    fn inputs(&self) -> Vec<&str> {
        self.inputs.iter().map(String::as_str).collect()
    }

    fn outputs(&self) -> Vec<&str> {
        self.targets.iter().map(String::as_str).collect()
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        for label in &self.inputs {
            self.matrix.set(label, values.get(label)?.clone());
        }
        self.matrix.apply()?;
        for label in &self.targets {
            values.add(label, self.matrix.get(label)?.clone())?;
        }
        Ok(())
    }
}
