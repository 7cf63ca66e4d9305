//! Component parameters as they appear in scenario files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, SimError};
use crate::sim::store::ValueStore;
use crate::sim::value::{Shape, Value};

use super::types::BuildContext;

/// Raw parameter value: a number, a label, or a (possibly nested) list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    List(Vec<ParamValue>),
    Table(IndexMap<String, ParamValue>),
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        Self::List(v)
    }
}

/// A factor that is either looked up by label or given literally.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Label(String),
    Literal(Value),
}

impl Operand {
    /// The referenced label, if this operand is not a literal.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Label(l) => Some(l),
            Self::Literal(_) => None,
        }
    }

    /// Current value of the operand.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UninitializedValue`] for an unset label.
    pub fn resolve(&self, values: &ValueStore) -> Result<Value> {
        match self {
            Self::Label(l) => values.get(l).cloned(),
            Self::Literal(v) => Ok(v.clone()),
        }
    }
}

/// Typed accessor over one component's parameter table.
///
/// Every accessor reports errors against the component's position and kind
/// so messages point back to the offending scenario entry.
pub struct Params<'a> {
    index: usize,
    kind: &'a str,
    values: &'a IndexMap<String, ParamValue>,
    ctx: BuildContext,
}

impl<'a> Params<'a> {
    pub fn new(
        index: usize,
        kind: &'a str,
        values: &'a IndexMap<String, ParamValue>,
        ctx: BuildContext,
    ) -> Self {
        Self {
            index,
            kind,
            values,
            ctx,
        }
    }

    pub fn context(&self) -> BuildContext {
        self.ctx
    }

    pub fn missing(&self, param: &str) -> ConfigError {
        ConfigError::MissingParameter {
            index: self.index,
            kind: self.kind.to_string(),
            param: param.to_string(),
        }
    }

    pub fn invalid(&self, param: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidParameter {
            index: self.index,
            kind: self.kind.to_string(),
            param: param.to_string(),
            message: message.into(),
        }
    }

    /// Rejects any parameter not listed in `known`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownParameter`] for the first stray key.
    pub fn allow_only(&self, known: &[&str]) -> std::result::Result<(), ConfigError> {
        match self.values.keys().find(|k| !known.contains(&k.as_str())) {
            Some(param) => Err(ConfigError::UnknownParameter {
                index: self.index,
                kind: self.kind.to_string(),
                param: param.clone(),
            }),
            None => Ok(()),
        }
    }

    fn required(&self, name: &str) -> std::result::Result<&'a ParamValue, ConfigError> {
        self.values.get(name).ok_or_else(|| self.missing(name))
    }

    /// The parameter exactly as written, for components with bespoke forms.
    pub fn raw(&self, name: &str) -> std::result::Result<&'a ParamValue, ConfigError> {
        self.required(name)
    }

    pub fn label(&self, name: &str) -> std::result::Result<String, ConfigError> {
        match self.required(name)? {
            ParamValue::Text(s) if !s.is_empty() => Ok(s.clone()),
            _ => Err(self.invalid(name, "must be a non-empty label")),
        }
    }

    pub fn opt_label(&self, name: &str) -> std::result::Result<Option<String>, ConfigError> {
        if self.values.contains_key(name) {
            self.label(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A list of labels (a single label is accepted as a one-element list).
    pub fn labels(&self, name: &str) -> std::result::Result<Vec<String>, ConfigError> {
        match self.required(name)? {
            ParamValue::Text(s) if !s.is_empty() => Ok(vec![s.clone()]),
            ParamValue::List(items) => items
                .iter()
                .map(|item| match item {
                    ParamValue::Text(s) if !s.is_empty() => Ok(s.clone()),
                    _ => Err(self.invalid(name, "must be a list of labels")),
                })
                .collect(),
            _ => Err(self.invalid(name, "must be a list of labels")),
        }
    }

    /// A non-negative whole number no larger than `u32::MAX`.
    pub fn count(&self, name: &str) -> std::result::Result<usize, ConfigError> {
        match self.required(name)? {
            ParamValue::Number(x) if *x >= 0.0 && x.fract() == 0.0 && *x <= f64::from(u32::MAX) => {
                Ok(*x as usize)
            }
            _ => Err(self.invalid(
                name,
                format!("must be a whole number between 0 and {}", u32::MAX),
            )),
        }
    }

    pub fn opt_count(&self, name: &str) -> std::result::Result<Option<usize>, ConfigError> {
        if self.values.contains_key(name) {
            self.count(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A literal scalar or per-stratum vector.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-numeric input and
    /// [`SimError::Shape`] for a vector whose length differs from the run's
    /// stratum count.
    pub fn literal(&self, name: &str) -> Result<Value> {
        let raw = self.required(name)?;
        self.literal_from(name, raw)
    }

    fn literal_from(&self, name: &str, raw: &ParamValue) -> Result<Value> {
        let value = match raw {
            ParamValue::Number(x) => Value::Scalar(*x),
            ParamValue::List(items) => Value::Vector(
                items
                    .iter()
                    .map(|item| match item {
                        ParamValue::Number(x) => Ok(*x),
                        _ => Err(self.invalid(name, "vector literal must contain only numbers")),
                    })
                    .collect::<std::result::Result<Vec<f64>, ConfigError>>()?,
            ),
            _ => return Err(self.invalid(name, "must be a number or a list of numbers").into()),
        };
        self.check_strata(name, &value)?;
        Ok(value)
    }

    fn check_strata(&self, name: &str, value: &Value) -> Result<()> {
        match (self.ctx.strata, value.shape()) {
            (Some(n), Shape::Strata(found)) if found != n => Err(SimError::shape(
                format!("{}.{name}", self.kind),
                Shape::Strata(n),
                Shape::Strata(found),
            )),
            _ => Ok(()),
        }
    }

    fn operand_from(&self, name: &str, raw: &ParamValue) -> Result<Operand> {
        match raw {
            ParamValue::Text(s) if !s.is_empty() => Ok(Operand::Label(s.clone())),
            ParamValue::Text(_) | ParamValue::Table(_) => {
                Err(self.invalid(name, "must be a label or a literal").into())
            }
            other => self.literal_from(name, other).map(Operand::Literal),
        }
    }

    /// A label reference or a literal.
    pub fn operand(&self, name: &str) -> Result<Operand> {
        let raw = self.required(name)?;
        self.operand_from(name, raw)
    }

    /// Sum-of-products terms.
    ///
    /// Accepted forms: a single label or number (one single-factor term); a
    /// list whose items are terms. A term is a label, a number, or a list of
    /// factors; inside a term a nested list of numbers is a vector literal.
    pub fn terms(&self, name: &str) -> Result<Vec<Vec<Operand>>> {
        let raw = self.required(name)?;
        let items = match raw {
            ParamValue::List(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        if items.is_empty() {
            return Err(self.invalid(name, "must contain at least one term").into());
        }
        items
            .iter()
            .map(|term| match term {
                ParamValue::List(factors) if factors.is_empty() => {
                    Err(self.invalid(name, "terms must have at least one factor").into())
                }
                ParamValue::List(factors) => factors
                    .iter()
                    .map(|f| self.operand_from(name, f))
                    .collect::<Result<Vec<Operand>>>(),
                single => Ok(vec![self.operand_from(name, single)?]),
            })
            .collect()
    }

    /// A list of tables, e.g. transition declarations.
    pub fn tables(
        &self,
        name: &str,
    ) -> std::result::Result<Vec<&'a IndexMap<String, ParamValue>>, ConfigError> {
        match self.required(name)? {
            ParamValue::List(items) => items
                .iter()
                .map(|item| match item {
                    ParamValue::Table(t) => Ok(t),
                    _ => Err(self.invalid(name, "must be a list of tables")),
                })
                .collect(),
            _ => Err(self.invalid(name, "must be a list of tables")),
        }
    }

    /// Accessor over a nested table, sharing this component's error context.
    pub fn nested(&self, values: &'a IndexMap<String, ParamValue>) -> Params<'a> {
        Params {
            index: self.index,
            kind: self.kind,
            values,
            ctx: self.ctx,
        }
    }
}
