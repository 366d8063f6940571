//! # Error Types
//!
//! Mean functions fail for two reasons: the input does not fit the
//! parameters (a shape mismatch), or a node was asked to evaluate without
//! knowing how. Construction and configuration add their own validation
//! failures on top.

use thiserror::Error;

/// Errors raised while building or evaluating a mean function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeanError {
    /// A `Mean` implementation fell through to the default `evaluate`.
    #[error("Mean function `{name}` does not implement evaluate")]
    NotImplemented { name: &'static str },

    /// Dimensions don't line up in a product or an elementwise combination.
    #[error("Shape mismatch in {op}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// A parameter failed validation at construction time.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A JSON mean-function description could not be read.
    #[error("Invalid mean configuration: {0}")]
    Config(String),
}

impl MeanError {
    pub(crate) fn shape(op: &'static str, expected: &[usize], got: &[usize]) -> Self {
        MeanError::ShapeMismatch {
            op,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        MeanError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
