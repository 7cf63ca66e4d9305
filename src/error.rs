//! Error taxonomy for graph construction and day execution.

use thiserror::Error;

use crate::sim::value::Shape;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Structural problems detected before day 0.
///
/// Every variant is fatal: a scenario that produces one of these never
/// starts simulating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("component #{index}: unknown kind \"{kind}\" (registered: {available})")]
    UnknownKind {
        index: usize,
        kind: String,
        available: String,
    },

    #[error("component #{index} ({kind}): missing required parameter `{param}`")]
    MissingParameter {
        index: usize,
        kind: String,
        param: String,
    },

    #[error("component #{index} ({kind}): parameter `{param}` {message}")]
    InvalidParameter {
        index: usize,
        kind: String,
        param: String,
        message: String,
    },

    #[error("component #{index} ({kind}): unknown parameter `{param}`")]
    UnknownParameter {
        index: usize,
        kind: String,
        param: String,
    },

    #[error("resource \"{resource}\" is managed by both component #{first} and #{second}")]
    DuplicateResource {
        resource: String,
        first: usize,
        second: usize,
    },

    #[error("component #{index} ({kind}): no allocate component manages resource \"{resource}\"")]
    UnknownResource {
        index: usize,
        kind: String,
        resource: String,
    },

    #[error("component #{index} ({kind}): input `{label}` is not a pole, an input, or any component's output")]
    UnresolvedInput {
        index: usize,
        kind: String,
        label: String,
    },

    #[error("dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

/// Any failure the engine can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("value `{label}` was read before it was ever set")]
    UninitializedValue { label: String },

    #[error("shape mismatch on `{label}`: expected {expected}, found {found}")]
    Shape {
        label: String,
        expected: Shape,
        found: Shape,
    },
}

impl SimError {
    pub(crate) fn uninitialized(label: impl Into<String>) -> Self {
        Self::UninitializedValue {
            label: label.into(),
        }
    }

    pub(crate) fn shape(label: impl Into<String>, expected: Shape, found: Shape) -> Self {
        Self::Shape {
            label: label.into(),
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = ConfigError::Cycle {
            path: vec!["#0 transfer".into(), "a".into(), "#1 transfer".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle: #0 transfer -> a -> #1 transfer");
    }

    #[test]
    fn config_error_converts_into_sim_error() {
        let err: SimError = ConfigError::Invalid {
            field: "simulation.num_days".into(),
            message: "must be > 0".into(),
        }
        .into();
        assert!(matches!(err, SimError::Config(_)));
        assert!(err.to_string().contains("simulation.num_days"));
    }

    #[test]
    fn shape_message_names_both_shapes() {
        let err = SimError::shape("demand", Shape::Strata(3), Shape::Scalar);
        assert_eq!(
            err.to_string(),
            "shape mismatch on `demand`: expected 3 strata, found scalar"
        );
    }
}
