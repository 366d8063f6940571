//! # JSON Configuration
//!
//! A mean function can be described as data and built later:
//!
//! ```rust
//! use compositional_gp::{Mean, MeanFunction};
//! use ndarray::array;
//!
//! let mean = MeanFunction::from_json(r#"{
//!     "type": "add",
//!     "left":  {"type": "linear", "coeffs": [1.0, 1.0]},
//!     "right": {"type": "constant", "c": 5}
//! }"#).unwrap();
//!
//! let x = array![[1.0, 2.0], [3.0, 4.0]];
//! assert_eq!(mean.evaluate(x.view()).unwrap(), array![8.0, 12.0]);
//! ```
//!
//! `c` and `intercept` take a number or an array and default to `0`.
//! `coeffs` takes a vector or a single-column matrix.
//!
//! ## Limits
//!
//! JSON has no representation for `inf` or `NaN`, so [`MeanConfig::to_json`]
//! rejects trees with non-finite parameters. It also rejects trees deeper than
//! [`MAX_CONFIG_DEPTH`] levels, which keeps every document it writes within
//! `serde_json`'s nesting limit for [`MeanConfig::from_json`].

use ndarray::{arr1, Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::combinator::{Add, Prod};
use crate::error::MeanError;
use crate::function::MeanFunction;
use crate::mean::{Constant, Linear};

/// Deepest tree [`MeanConfig::to_json`] will write (a single leaf has depth 1).
pub const MAX_CONFIG_DEPTH: usize = 64;

/// A scalar or per-row parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueConfig {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Default for ValueConfig {
    fn default() -> Self {
        ValueConfig::Scalar(0.0)
    }
}

impl ValueConfig {
    fn to_array(&self, name: &str) -> Result<Array1<f64>, MeanError> {
        let values = match self {
            ValueConfig::Scalar(v) => arr1(&[*v]),
            ValueConfig::Array(v) if v.is_empty() => {
                return Err(MeanError::invalid(name, "must not be empty"));
            }
            ValueConfig::Array(v) => Array1::from(v.clone()),
        };
        check_finite(name, values.iter())?;
        Ok(values)
    }

    fn values(&self) -> impl Iterator<Item = &f64> {
        match self {
            ValueConfig::Scalar(v) => std::slice::from_ref(v).iter(),
            ValueConfig::Array(v) => v.iter(),
        }
    }

    fn from_array(values: &Array1<f64>) -> Self {
        if values.len() == 1 {
            ValueConfig::Scalar(values[0])
        } else {
            ValueConfig::Array(values.to_vec())
        }
    }
}

/// Linear coefficients: a vector, or a `k × 1` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoeffsConfig {
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl CoeffsConfig {
    fn values(&self) -> Box<dyn Iterator<Item = &f64> + '_> {
        match self {
            CoeffsConfig::Vector(v) => Box::new(v.iter()),
            CoeffsConfig::Matrix(rows) => Box::new(rows.iter().flatten()),
        }
    }

    fn to_linear(&self) -> Result<Linear, MeanError> {
        match self {
            CoeffsConfig::Vector(v) => {
                if v.is_empty() {
                    return Err(MeanError::invalid("coeffs", "must not be empty"));
                }
                check_finite("coeffs", v.iter())?;
                Ok(Linear::new(Array1::from(v.clone())))
            }
            CoeffsConfig::Matrix(rows) => {
                let n_cols = rows.first().map_or(0, Vec::len);
                if rows.is_empty() || n_cols == 0 {
                    return Err(MeanError::invalid("coeffs", "must not be empty"));
                }
                if rows.iter().any(|row| row.len() != n_cols) {
                    return Err(MeanError::invalid(
                        "coeffs",
                        "matrix has ragged rows (rows have different lengths)",
                    ));
                }
                check_finite("coeffs", rows.iter().flatten())?;
                let matrix = Array2::from_shape_vec((rows.len(), n_cols), rows.concat())
                    .map_err(|e| MeanError::invalid("coeffs", e.to_string()))?;
                Linear::from_matrix(matrix)
            }
        }
    }
}

fn check_finite<'a>(name: &str, mut values: impl Iterator<Item = &'a f64>) -> Result<(), MeanError> {
    if values.any(|v| !v.is_finite()) {
        return Err(MeanError::invalid(name, "values must be finite"));
    }
    Ok(())
}

/// Serializable description of a mean-function tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MeanConfig {
    Zero,
    Constant {
        #[serde(default)]
        c: ValueConfig,
    },
    Linear {
        coeffs: CoeffsConfig,
        #[serde(default)]
        intercept: ValueConfig,
    },
    Add {
        left: Box<MeanConfig>,
        right: Box<MeanConfig>,
    },
    Prod {
        left: Box<MeanConfig>,
        right: Box<MeanConfig>,
    },
}

impl MeanConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, MeanError> {
        serde_json::from_str(json).map_err(|e| MeanError::Config(e.to_string()))
    }

    /// Render this configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`MeanError::InvalidParameter`] if a parameter is not finite, and
    /// [`MeanError::Config`] if the tree is deeper than [`MAX_CONFIG_DEPTH`].
    pub fn to_json(&self) -> Result<String, MeanError> {
        let depth = self.depth();
        if depth > MAX_CONFIG_DEPTH {
            return Err(MeanError::Config(format!(
                "tree depth {} exceeds the limit of {}",
                depth, MAX_CONFIG_DEPTH
            )));
        }
        self.check_finite()?;
        serde_json::to_string_pretty(self).map_err(|e| MeanError::Config(e.to_string()))
    }

    /// Height of the described tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            MeanConfig::Add { left, right } | MeanConfig::Prod { left, right } => {
                1 + left.depth().max(right.depth())
            }
            _ => 1,
        }
    }

    fn check_finite(&self) -> Result<(), MeanError> {
        match self {
            MeanConfig::Zero => Ok(()),
            MeanConfig::Constant { c } => check_finite("c", c.values()),
            MeanConfig::Linear { coeffs, intercept } => {
                check_finite("coeffs", coeffs.values())?;
                check_finite("intercept", intercept.values())
            }
            MeanConfig::Add { left, right } | MeanConfig::Prod { left, right } => {
                left.check_finite()?;
                right.check_finite()
            }
        }
    }

    /// Validate parameters and build the mean function.
    pub fn build(&self) -> Result<MeanFunction, MeanError> {
        match self {
            MeanConfig::Zero => Ok(MeanFunction::Zero),
            MeanConfig::Constant { c } => Ok(Constant::from_array(c.to_array("c")?).into()),
            MeanConfig::Linear { coeffs, intercept } => Ok(coeffs
                .to_linear()?
                .with_intercept_array(intercept.to_array("intercept")?)
                .into()),
            MeanConfig::Add { left, right } => Ok(Add::new(left.build()?, right.build()?).into()),
            MeanConfig::Prod { left, right } => {
                Ok(Prod::new(left.build()?, right.build()?).into())
            }
        }
    }
}

impl From<&MeanFunction> for MeanConfig {
    fn from(mean: &MeanFunction) -> Self {
        match mean {
            MeanFunction::Zero => MeanConfig::Zero,
            MeanFunction::Constant(constant) => MeanConfig::Constant {
                c: ValueConfig::from_array(&constant.c),
            },
            MeanFunction::Linear(linear) => MeanConfig::Linear {
                coeffs: CoeffsConfig::Vector(linear.coeffs.to_vec()),
                intercept: ValueConfig::from_array(&linear.intercept),
            },
            MeanFunction::Add(node) => MeanConfig::Add {
                left: Box::new(node.left.as_ref().into()),
                right: Box::new(node.right.as_ref().into()),
            },
            MeanFunction::Prod(node) => MeanConfig::Prod {
                left: Box::new(node.left.as_ref().into()),
                right: Box::new(node.right.as_ref().into()),
            },
        }
    }
}

impl MeanFunction {
    /// Parse and build a mean function from JSON.
    pub fn from_json(json: &str) -> Result<Self, MeanError> {
        MeanConfig::from_json(json)?.build()
    }

    /// Describe this mean function as a configuration.
    pub fn to_config(&self) -> MeanConfig {
        self.into()
    }
}
