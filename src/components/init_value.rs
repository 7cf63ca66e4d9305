use crate::error::Result;
use crate::sim::store::ValueStore;
use crate::sim::value::Value;

use super::ledger::Ledgers;
use super::params::Params;
use super::types::Component;

/// Writes a constant on the first day only.
#[derive(Debug, Clone)]
pub struct InitValue {
    to: String,
    value: Value,
    written: bool,
}

impl InitValue {
    pub fn new(to: &str, value: Value) -> Self {
        Self {
            to: to.to_string(),
            value,
            written: false,
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["to", "literal"])?;
        Ok(Box::new(Self::new(
            &params.label("to")?,
            params.literal("literal")?,
        )))
    }
}

impl Component for InitValue {
    fn component_type(&self) -> &'static str {
        "init_value"
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.to.as_str()]
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        if self.written {
            return Ok(());
        }
        values.add(&self.to, self.value.clone())?;
        self.written = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_once_and_value_persists() {
        let mut init = InitValue::new("seed", Value::from(vec![1.0, 2.0]));
        let mut values = ValueStore::new();
        let mut ledgers = Ledgers::new();
        for _ in 0..3 {
            init.apply(&mut values, &mut ledgers).unwrap();
            values.commit();
        }
        assert_eq!(values.get("seed").unwrap(), &Value::from(vec![1.0, 2.0]));
    }
}
