//! Scalar and per-stratum vector quantities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Shape of a named value: a single number, or one number per stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Strata(usize),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Strata(n) => write!(f, "{n} strata"),
        }
    }
}

/// A quantity tracked by the simulation.
///
/// Arithmetic follows broadcasting rules: a scalar combines with every
/// element of a vector, two vectors combine elementwise and must have the
/// same stratum count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    /// All-zero value of the given shape.
    pub fn zeros(shape: Shape) -> Self {
        match shape {
            Shape::Scalar => Self::Scalar(0.0),
            Shape::Strata(n) => Self::Vector(vec![0.0; n]),
        }
    }

    /// Rebuilds a value of `shape` from its elements.
    ///
    /// A scalar shape takes the first element (zero when `elements` is empty).
    pub fn from_elements(shape: Shape, elements: Vec<f64>) -> Self {
        match shape {
            Shape::Scalar => Self::Scalar(elements.first().copied().unwrap_or(0.0)),
            Shape::Strata(_) => Self::Vector(elements),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::Scalar,
            Self::Vector(v) => Shape::Strata(v.len()),
        }
    }

    /// Elements as a slice; a scalar is a one-element slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(x) => std::slice::from_ref(x),
            Self::Vector(v) => v,
        }
    }

    /// Sum over all elements.
    pub fn sum(&self) -> f64 {
        self.as_slice().iter().sum()
    }

    /// Largest element.
    pub fn max_element(&self) -> f64 {
        self.as_slice()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Option<Self> {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Some(Self::Scalar(f(*a, *b))),
            (Self::Scalar(a), Self::Vector(v)) => {
                Some(Self::Vector(v.iter().map(|x| f(*a, *x)).collect()))
            }
            (Self::Vector(v), Self::Scalar(b)) => {
                Some(Self::Vector(v.iter().map(|x| f(*x, *b)).collect()))
            }
            (Self::Vector(a), Self::Vector(b)) if a.len() == b.len() => Some(Self::Vector(
                a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect(),
            )),
            _ => None,
        }
    }

    /// Broadcasting sum. `label` names the quantity in the error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Shape`] when both sides are vectors of different lengths.
    pub fn try_add(&self, other: &Self, label: &str) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
            .ok_or_else(|| SimError::shape(label, self.shape(), other.shape()))
    }

    /// Broadcasting product. `label` names the quantity in the error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Shape`] when both sides are vectors of different lengths.
    pub fn try_mul(&self, other: &Self, label: &str) -> Result<Self> {
        self.zip_with(other, |a, b| a * b)
            .ok_or_else(|| SimError::shape(label, self.shape(), other.shape()))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "{x:.4}"),
            Self::Vector(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x:.4}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_broadcasts_over_vector() {
        let v = Value::from(vec![1.0, 2.0, 3.0]);
        let out = Value::from(2.0).try_mul(&v, "x").unwrap();
        assert_eq!(out, Value::from(vec![2.0, 4.0, 6.0]));
    }

    #[test]
    fn mismatched_vectors_are_a_shape_error() {
        let a = Value::from(vec![1.0, 2.0]);
        let b = Value::from(vec![1.0, 2.0, 3.0]);
        let err = a.try_add(&b, "flow");
        assert_eq!(
            err,
            Err(SimError::shape("flow", Shape::Strata(2), Shape::Strata(3)))
        );
    }

    #[test]
    fn sum_and_max_cover_all_strata() {
        let v = Value::from(vec![1.5, -2.0, 4.0]);
        assert_eq!(v.sum(), 3.5);
        assert_eq!(v.max_element(), 4.0);
        assert_eq!(Value::from(7.0).sum(), 7.0);
    }

    #[test]
    fn zeros_has_requested_shape() {
        assert_eq!(Value::zeros(Shape::Strata(2)), Value::from(vec![0.0, 0.0]));
        assert_eq!(Value::zeros(Shape::Scalar).shape(), Shape::Scalar);
    }

    #[test]
    fn deserializes_untagged() {
        let s: Value = serde_json::from_str("3").unwrap();
        assert_eq!(s, Value::Scalar(3.0));
        let v: Value = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(v, Value::from(vec![1.0, 2.5]));
    }
}
