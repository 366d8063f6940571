//! # Leaf Mean Functions
//!
//! A mean function maps a batch of input points to one prior mean per point:
//!
//! ```text
//!            ┌────────┐
//!    X ─────▶│  mean  │─────▶ m
//!  (n × k)   └────────┘      (n)
//! ```
//!
//! The [`Mean`] trait is the contract. This module provides the three leaves
//! (nodes without sub-mean-functions):
//!
//! | Leaf | Output |
//! |------|--------|
//! | [`Zero`] | `0` for every row |
//! | [`Constant`] | `c` for every row |
//! | [`Linear`] | `X · coeffs + intercept` |
//!
//! The combinators live in [`crate::combinator`].

use std::fmt;

use ndarray::{arr1, Array1, Array2, ArrayView2};

use crate::error::MeanError;

/// A function from input points to a prior mean vector.
///
/// Implementors must return a vector with exactly one entry per row of `x`.
///
/// # Example
///
/// ```rust
/// use compositional_gp::{Mean, Constant};
/// use ndarray::array;
///
/// let x = array![[1.0, 2.0], [3.0, 4.0]];
/// let m = Constant::new(5.0).evaluate(x.view()).unwrap();
/// assert_eq!(m, array![5.0, 5.0]);
/// ```
pub trait Mean: Send + Sync {
    /// Evaluate the mean function at the rows of `x`.
    ///
    /// The default implementation fails with [`MeanError::NotImplemented`].
    fn evaluate(&self, _x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        Err(MeanError::NotImplemented { name: self.name() })
    }

    /// Name of this mean function for display and tracing.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Stretch a parameter to one value per input row.
///
/// Length-1 parameters repeat; length-`n` parameters pass through.
pub(crate) fn broadcast_rows(
    op: &'static str,
    value: &Array1<f64>,
    n: usize,
) -> Result<Array1<f64>, MeanError> {
    value
        .broadcast(n)
        .map(|view| view.to_owned())
        .ok_or_else(|| MeanError::shape(op, &[n], value.shape()))
}

fn fmt_param(f: &mut fmt::Formatter<'_>, value: &Array1<f64>) -> fmt::Result {
    if value.len() == 1 {
        write!(f, "{}", value[0])
    } else {
        write!(f, "{}", value)
    }
}

// ============================================================================
// Zero
// ============================================================================

/// The zero mean: `m(X) = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zero;

impl Mean for Zero {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        Ok(Array1::zeros(x.nrows()))
    }

    fn name(&self) -> &'static str {
        "zero"
    }
}

impl fmt::Display for Zero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zero")
    }
}

// ============================================================================
// Constant
// ============================================================================

/// A constant mean: `m(X) = c` for every row.
///
/// `c` is stored as a vector. A single value is repeated for every row; a
/// vector with one entry per row is used as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// The constant value(s)
    pub c: Array1<f64>,
}

impl Constant {
    /// Create a constant mean with scalar value `c`.
    pub fn new(c: f64) -> Self {
        Self { c: arr1(&[c]) }
    }

    /// Create a constant mean from an array of values.
    ///
    /// At evaluation time the array must have length 1 or match the number
    /// of input rows.
    pub fn from_array(c: Array1<f64>) -> Self {
        Self { c }
    }

    /// Whether `c` is a single value.
    pub fn is_scalar(&self) -> bool {
        self.c.len() == 1
    }
}

impl Default for Constant {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Mean for Constant {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        broadcast_rows("constant", &self.c, x.nrows())
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constant(")?;
        fmt_param(f, &self.c)?;
        write!(f, ")")
    }
}

// ============================================================================
// Linear
// ============================================================================

/// A linear mean: `m(X) = X · coeffs + intercept`.
///
/// # Example
///
/// ```rust
/// use compositional_gp::{Mean, Linear};
/// use ndarray::array;
///
/// let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
/// let linear = Linear::new(array![1.0, 1.0]);
/// assert_eq!(linear.evaluate(x.view()).unwrap(), array![3.0, 7.0, 11.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// One coefficient per input column
    pub coeffs: Array1<f64>,
    /// Offset, a single value or one per input row
    pub intercept: Array1<f64>,
}

impl Linear {
    /// Create a linear mean with zero intercept.
    pub fn new(coeffs: Array1<f64>) -> Self {
        Self {
            coeffs,
            intercept: arr1(&[0.0]),
        }
    }

    /// Create a linear mean from a `k × 1` coefficient matrix.
    ///
    /// # Errors
    ///
    /// A matrix with more than one column would produce one output column per
    /// coefficient column, which can't be squeezed to a mean vector. A matrix
    /// without rows is an [`MeanError::InvalidParameter`].
    pub fn from_matrix(coeffs: Array2<f64>) -> Result<Self, MeanError> {
        if coeffs.ncols() != 1 {
            return Err(MeanError::shape(
                "linear",
                &[coeffs.nrows(), 1],
                coeffs.shape(),
            ));
        }
        if coeffs.nrows() == 0 {
            return Err(MeanError::invalid("coeffs", "must not be empty"));
        }
        Ok(Self::new(coeffs.column(0).to_owned()))
    }

    /// Set a scalar intercept.
    pub fn with_intercept(self, intercept: f64) -> Self {
        self.with_intercept_array(arr1(&[intercept]))
    }

    /// Set a per-row (or length-1) intercept.
    pub fn with_intercept_array(mut self, intercept: Array1<f64>) -> Self {
        self.intercept = intercept;
        self
    }

    /// Number of input columns this mean expects.
    pub fn n_features(&self) -> usize {
        self.coeffs.len()
    }
}

impl Mean for Linear {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        let (n, k) = x.dim();
        if k != self.n_features() {
            return Err(MeanError::shape("linear", &[n, self.n_features()], &[n, k]));
        }
        let intercept = broadcast_rows("linear", &self.intercept, n)?;
        Ok(x.dot(&self.coeffs) + intercept)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

impl fmt::Display for Linear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Linear(k={}", self.n_features())?;
        if self.intercept.iter().any(|&b| b != 0.0) {
            write!(f, ", b=")?;
            fmt_param(f, &self.intercept)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn sample_x() -> Array2<f64> {
        array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]
    }

    struct Unfinished;

    impl Mean for Unfinished {}

    #[test]
    fn test_default_evaluate_is_not_implemented() {
        let x = sample_x();
        let err = Unfinished.evaluate(x.view()).unwrap_err();
        assert!(matches!(err, MeanError::NotImplemented { name } if name.ends_with("Unfinished")));
    }

    #[test]
    fn test_zero() {
        let x = sample_x();
        assert_eq!(Zero.evaluate(x.view()).unwrap(), array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_empty_input() {
        let x = Array2::<f64>::zeros((0, 4));
        assert_eq!(Zero.evaluate(x.view()).unwrap().len(), 0);
    }

    #[test]
    fn test_constant_scalar() {
        let x = sample_x();
        let m = Constant::new(5.0).evaluate(x.view()).unwrap();
        assert_eq!(m, array![5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_constant_default_is_zero() {
        let x = sample_x();
        let m = Constant::default().evaluate(x.view()).unwrap();
        assert_eq!(m, array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_constant_per_row() {
        let x = sample_x();
        let c = Constant::from_array(array![1.0, 2.0, 3.0]);
        assert!(!c.is_scalar());
        assert_eq!(c.evaluate(x.view()).unwrap(), array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_constant_wrong_length() {
        let x = sample_x();
        let err = Constant::from_array(array![1.0, 2.0])
            .evaluate(x.view())
            .unwrap_err();
        assert_eq!(err, MeanError::shape("constant", &[3], &[2]));
    }

    #[test]
    fn test_linear_values() {
        let x = sample_x();
        let m = Linear::new(array![1.0, 1.0]).evaluate(x.view()).unwrap();
        assert_abs_diff_eq!(m, array![3.0, 7.0, 11.0], epsilon = 1e-12);
    }

    #[test]
    fn test_linear_with_intercept() {
        let x = sample_x();
        let linear = Linear::new(array![2.0, -1.0]).with_intercept(0.5);
        let m = linear.evaluate(x.view()).unwrap();
        assert_abs_diff_eq!(m, array![0.5, 2.5, 4.5], epsilon = 1e-12);
    }

    #[test]
    fn test_linear_per_row_intercept() {
        let x = sample_x();
        let linear = Linear::new(array![1.0, 0.0]).with_intercept_array(array![10.0, 20.0, 30.0]);
        let m = linear.evaluate(x.view()).unwrap();
        assert_abs_diff_eq!(m, array![11.0, 23.0, 35.0], epsilon = 1e-12);
    }

    #[test]
    fn test_linear_intercept_wrong_length() {
        let x = sample_x();
        let err = Linear::new(array![1.0, 1.0])
            .with_intercept_array(array![1.0, 2.0])
            .evaluate(x.view())
            .unwrap_err();
        assert_eq!(
            err,
            MeanError::ShapeMismatch {
                op: "linear",
                expected: vec![3],
                got: vec![2],
            }
        );
    }

    #[test]
    fn test_linear_feature_mismatch() {
        let x = sample_x();
        let err = Linear::new(array![1.0, 1.0, 1.0])
            .evaluate(x.view())
            .unwrap_err();
        assert_eq!(err, MeanError::shape("linear", &[3, 3], &[3, 2]));
    }

    #[test]
    fn test_linear_from_column_matrix() {
        let x = sample_x();
        let linear = Linear::from_matrix(array![[1.0], [1.0]]).unwrap();
        assert_eq!(linear.n_features(), 2);
        assert_abs_diff_eq!(
            linear.evaluate(x.view()).unwrap(),
            array![3.0, 7.0, 11.0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_linear_from_wide_matrix_rejected() {
        let err = Linear::from_matrix(array![[1.0, 0.0], [0.0, 1.0]]).unwrap_err();
        assert_eq!(err, MeanError::shape("linear", &[2, 1], &[2, 2]));
    }

    #[test]
    fn test_linear_from_empty_matrix_rejected() {
        let err = Linear::from_matrix(Array2::zeros((0, 1))).unwrap_err();
        assert!(matches!(err, MeanError::InvalidParameter { ref name, .. } if name == "coeffs"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Zero.to_string(), "Zero");
        assert_eq!(Constant::new(5.0).to_string(), "Constant(5)");
        assert_eq!(Linear::new(array![1.0, 2.0]).to_string(), "Linear(k=2)");
        assert_eq!(
            Linear::new(array![1.0]).with_intercept(0.5).to_string(),
            "Linear(k=1, b=0.5)"
        );
    }
}
