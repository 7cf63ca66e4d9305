//! Scenario configuration (TOML or JSON) and built-in presets.

use std::fs;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::components::ParamValue;
use crate::error::ConfigError;
use crate::sim::value::Value;

/// Top-level scenario: run length, poles, exogenous inputs and the
/// ordered component list.
///
/// Load from a file with [`ScenarioConfig::from_file`] or use a built-in
/// scenario via [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length and stratum count.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Externally driven labels with overwrite semantics.
    #[serde(default)]
    pub poles: Vec<PoleConfig>,
    /// Source labels set by the driver at the start of every day.
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
    /// Components in declaration order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// Run length and stratum count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate (must be > 0).
    pub num_days: usize,
    /// Length every vector pole, input and literal must have, when set.
    pub strata: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_days: 1,
            strata: None,
        }
    }
}

/// A pole and the value it holds before day 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoleConfig {
    pub name: String,
    pub initial_value: Value,
}

/// An exogenous input: a constant `value` or a per-day `series`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<Value>>,
}

impl InputConfig {
    /// Value to set on `day`, if the input defines one.
    pub fn value_on(&self, day: usize) -> Option<&Value> {
        match &self.series {
            Some(series) => series.get(day),
            None => self.value.as_ref(),
        }
    }
}

/// One component declaration: its registry kind and raw parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub kind: String,
    #[serde(default)]
    pub params: IndexMap<String, ParamValue>,
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        message: message.into(),
    }
}

const DEMO_TOML: &str = include_str!("../scenarios/demo.toml");
const PATIENT_PATHWAY_TOML: &str = include_str!("../scenarios/patient_pathway.toml");

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "patient_pathway"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Self::from_toml_str(DEMO_TOML),
            "patient_pathway" => Self::from_toml_str(PATIENT_PATHWAY_TOML),
            _ => Err(invalid(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Reads a scenario file; `.json` files are parsed as JSON, anything
    /// else as TOML.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            invalid("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| invalid("toml", e.to_string()))
    }

    /// Parses a scenario from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the JSON is invalid or contains unknown fields.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| invalid("json", e.to_string()))
    }

    /// Pole names in declaration order.
    pub fn pole_names(&self) -> IndexSet<String> {
        self.poles.iter().map(|p| p.name.clone()).collect()
    }

    /// Validates scenario-level fields and returns every problem found.
    ///
    /// Component parameters are checked when the engine builds each
    /// component, not here.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.num_days == 0 {
            errors.push(invalid("simulation.num_days", "must be > 0"));
        }
        if s.strata == Some(0) {
            errors.push(invalid("simulation.strata", "must be > 0"));
        }

        let mut poles = IndexSet::new();
        for (i, pole) in self.poles.iter().enumerate() {
            if pole.name.is_empty() {
                errors.push(invalid(format!("poles[{i}].name"), "must not be empty"));
            } else if !poles.insert(pole.name.as_str()) {
                errors.push(invalid(
                    format!("poles[{i}].name"),
                    format!("duplicate pole \"{}\"", pole.name),
                ));
            }
        }

        let mut inputs = IndexSet::new();
        for (i, input) in self.inputs.iter().enumerate() {
            if input.label.is_empty() {
                errors.push(invalid(format!("inputs[{i}].label"), "must not be empty"));
            } else if poles.contains(input.label.as_str()) {
                errors.push(invalid(
                    format!("inputs[{i}].label"),
                    format!("\"{}\" is already a pole", input.label),
                ));
            } else if !inputs.insert(input.label.as_str()) {
                errors.push(invalid(
                    format!("inputs[{i}].label"),
                    format!("duplicate input \"{}\"", input.label),
                ));
            }
            match (&input.value, &input.series) {
                (Some(_), None) => {}
                (None, Some(series)) if series.len() < s.num_days => {
                    errors.push(invalid(
                        format!("inputs[{i}].series"),
                        format!(
                            "has {} entries, needs at least one per day ({})",
                            series.len(),
                            s.num_days
                        ),
                    ));
                }
                (None, Some(_)) => {}
                _ => errors.push(invalid(
                    format!("inputs[{i}]"),
                    "must set exactly one of `value` or `series`",
                )),
            }
        }

        for (i, component) in self.components.iter().enumerate() {
            if component.kind.is_empty() {
                errors.push(invalid(format!("components[{i}].kind"), "must not be empty"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(e: &ConfigError) -> &str {
        match e {
            ConfigError::Invalid { field, .. } => field,
            _ => "",
        }
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load: {:?}", cfg.err());
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err_and(|e| e.to_string().contains("unknown preset")));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
num_days = 3
strata = 2

[[poles]]
name = "ed_capacity"
initial_value = 40

[[inputs]]
label = "cases"
series = [[1, 2], [3, 4], [5, 6]]

[[components]]
kind = "allocate"
params = { capacity = "ed_capacity", demand = "cases", admit = "a", excess = "e" }

[[components]]
kind = "transfer"
params = { output = "x", terms = [["a", [0.5, 1.0]], [2]] }
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert_eq!(cfg.simulation.num_days, 3);
        assert_eq!(cfg.poles[0].initial_value, Value::Scalar(40.0));
        assert_eq!(
            cfg.inputs[0].value_on(1),
            Some(&Value::from(vec![3.0, 4.0]))
        );
        assert_eq!(cfg.components.len(), 2);
        assert_eq!(
            cfg.components[0].params.get("capacity"),
            Some(&ParamValue::from("ed_capacity"))
        );
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn json_and_toml_agree() {
        let json = r#"{
            "simulation": { "num_days": 2 },
            "components": [
                { "kind": "sum_vector", "params": { "from": "v", "to": "t" } }
            ]
        }"#;
        let toml = r#"
[simulation]
num_days = 2

[[components]]
kind = "sum_vector"
params = { from = "v", to = "t" }
"#;
        let a = ScenarioConfig::from_json_str(json).map(|c| c.components);
        let b = ScenarioConfig::from_toml_str(toml).map(|c| c.components);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml = r#"
[simulation]
num_days = 2
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[simulation]\nstrata = 4\n");
        let cfg = cfg.unwrap();
        assert_eq!(cfg.simulation.num_days, 1);
        assert_eq!(cfg.simulation.strata, Some(4));
        assert!(cfg.components.is_empty());
    }

    #[test]
    fn validation_catches_zero_days() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.num_days = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| field_of(e) == "simulation.num_days"));
    }

    #[test]
    fn validation_catches_short_series_and_ambiguous_inputs() {
        let mut cfg = ScenarioConfig::default();
        cfg.simulation.num_days = 3;
        cfg.inputs = vec![
            InputConfig {
                label: "a".into(),
                value: None,
                series: Some(vec![Value::Scalar(1.0)]),
            },
            InputConfig {
                label: "b".into(),
                value: Some(Value::Scalar(1.0)),
                series: Some(vec![Value::Scalar(1.0); 3]),
            },
        ];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| field_of(e) == "inputs[0].series"));
        assert!(errors.iter().any(|e| field_of(e) == "inputs[1]"));
    }

    #[test]
    fn validation_catches_duplicate_poles() {
        let mut cfg = ScenarioConfig::default();
        let pole = PoleConfig {
            name: "signal".into(),
            initial_value: Value::Scalar(0.0),
        };
        cfg.poles = vec![pole.clone(), pole];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| field_of(e) == "poles[1].name"));
    }

    #[test]
    fn constant_input_applies_every_day() {
        let input = InputConfig {
            label: "x".into(),
            value: Some(Value::Scalar(2.0)),
            series: None,
        };
        assert_eq!(input.value_on(0), input.value_on(99));
    }
}
