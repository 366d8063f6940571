//! # Mean Function Trees
//!
//! [`MeanFunction`] is the closed set of mean functions. Leaves compute a
//! vector directly; combinators evaluate both children on the same input and
//! merge the results.
//!
//! Composition uses ordinary arithmetic. `+` builds an [`Add`] node and `*`
//! builds a [`Prod`] node:
//!
//! ```rust
//! use compositional_gp::{Constant, Linear, Mean, MeanFunction};
//! use ndarray::array;
//!
//! let trend = Linear::new(array![1.0, 1.0]) + Constant::new(1.0);
//! let scaled = trend * 2.0;
//! assert_eq!(scaled.to_string(), "((Linear(k=2) + Constant(1)) * Constant(2))");
//!
//! let x = array![[1.0, 2.0], [3.0, 4.0]];
//! assert_eq!(scaled.evaluate(x.view()).unwrap(), array![8.0, 16.0]);
//! ```
//!
//! Building a tree never evaluates anything.

use std::fmt;
use std::ops;

use ndarray::{Array1, ArrayView2};

use crate::combinator::{Add, Prod};
use crate::error::MeanError;
use crate::hooks::{EvalHook, NullHook};
use crate::mean::{Constant, Linear, Mean, Zero};

/// A composable mean function.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeanFunction {
    /// `m(X) = 0`
    #[default]
    Zero,
    /// `m(X) = c`
    Constant(Constant),
    /// `m(X) = X · coeffs + intercept`
    Linear(Linear),
    /// `m(X) = left(X) + right(X)`
    Add(Add),
    /// `m(X) = left(X) * right(X)`
    Prod(Prod),
}

impl MeanFunction {
    /// Evaluate the tree, reporting every node to `hook`.
    ///
    /// `on_error` fires for the failing node and again for each ancestor the
    /// error passes through.
    pub fn evaluate_with_hook(
        &self,
        x: ArrayView2<'_, f64>,
        hook: &dyn EvalHook,
    ) -> Result<Array1<f64>, MeanError> {
        self.eval_node(x, hook, 0)
    }

    pub(crate) fn eval_node(
        &self,
        x: ArrayView2<'_, f64>,
        hook: &dyn EvalHook,
        depth: usize,
    ) -> Result<Array1<f64>, MeanError> {
        let name = self.name();
        hook.on_node_start(name, depth);

        let result = match self {
            MeanFunction::Zero => Zero.evaluate(x),
            MeanFunction::Constant(constant) => constant.evaluate(x),
            MeanFunction::Linear(linear) => linear.evaluate(x),
            MeanFunction::Add(node) => node.eval_with(x, hook, depth + 1),
            MeanFunction::Prod(node) => node.eval_with(x, hook, depth + 1),
        };

        match &result {
            Ok(output) => hook.on_node_end(name, depth, output),
            Err(error) => hook.on_error(name, depth, error),
        }
        result
    }

    /// Whether this node has no sub-mean-functions.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, MeanFunction::Add(_) | MeanFunction::Prod(_))
    }

    /// Height of the tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            MeanFunction::Add(Add { left, right }) | MeanFunction::Prod(Prod { left, right }) => {
                1 + left.depth().max(right.depth())
            }
            _ => 1,
        }
    }

    /// Total number of nodes in the tree.
    pub fn n_nodes(&self) -> usize {
        match self {
            MeanFunction::Add(Add { left, right }) | MeanFunction::Prod(Prod { left, right }) => {
                1 + left.n_nodes() + right.n_nodes()
            }
            _ => 1,
        }
    }
}

impl Mean for MeanFunction {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        self.eval_node(x, &NullHook, 0)
    }

    fn name(&self) -> &'static str {
        match self {
            MeanFunction::Zero => Zero.name(),
            MeanFunction::Constant(constant) => constant.name(),
            MeanFunction::Linear(linear) => linear.name(),
            MeanFunction::Add(node) => node.name(),
            MeanFunction::Prod(node) => node.name(),
        }
    }
}

impl fmt::Display for MeanFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeanFunction::Zero => write!(f, "{}", Zero),
            MeanFunction::Constant(constant) => write!(f, "{}", constant),
            MeanFunction::Linear(linear) => write!(f, "{}", linear),
            MeanFunction::Add(node) => write!(f, "{}", node),
            MeanFunction::Prod(node) => write!(f, "{}", node),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Zero> for MeanFunction {
    fn from(_: Zero) -> Self {
        MeanFunction::Zero
    }
}

impl From<Constant> for MeanFunction {
    fn from(constant: Constant) -> Self {
        MeanFunction::Constant(constant)
    }
}

impl From<Linear> for MeanFunction {
    fn from(linear: Linear) -> Self {
        MeanFunction::Linear(linear)
    }
}

impl From<Add> for MeanFunction {
    fn from(node: Add) -> Self {
        MeanFunction::Add(node)
    }
}

impl From<Prod> for MeanFunction {
    fn from(node: Prod) -> Self {
        MeanFunction::Prod(node)
    }
}

impl From<&MeanFunction> for MeanFunction {
    fn from(mean: &MeanFunction) -> Self {
        mean.clone()
    }
}

/// A bare number is a constant mean.
impl From<f64> for MeanFunction {
    fn from(c: f64) -> Self {
        MeanFunction::Constant(Constant::new(c))
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

macro_rules! impl_mean_ops {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<R: Into<MeanFunction>> ops::Add<R> for $ty {
                type Output = MeanFunction;

                fn add(self, rhs: R) -> MeanFunction {
                    MeanFunction::Add(Add::new(self, rhs))
                }
            }

            impl<R: Into<MeanFunction>> ops::Mul<R> for $ty {
                type Output = MeanFunction;

                fn mul(self, rhs: R) -> MeanFunction {
                    MeanFunction::Prod(Prod::new(self, rhs))
                }
            }
        )*
    };
}

impl_mean_ops!(MeanFunction, Zero, Constant, Linear, Add, Prod);

impl<R: Into<MeanFunction>> ops::Add<R> for &MeanFunction {
    type Output = MeanFunction;

    fn add(self, rhs: R) -> MeanFunction {
        MeanFunction::Add(Add::new(self.clone(), rhs))
    }
}

impl<R: Into<MeanFunction>> ops::Mul<R> for &MeanFunction {
    type Output = MeanFunction;

    fn mul(self, rhs: R) -> MeanFunction {
        MeanFunction::Prod(Prod::new(self.clone(), rhs))
    }
}

impl ops::Add<MeanFunction> for f64 {
    type Output = MeanFunction;

    fn add(self, rhs: MeanFunction) -> MeanFunction {
        MeanFunction::Add(Add::new(self, rhs))
    }
}

impl ops::Mul<MeanFunction> for f64 {
    type Output = MeanFunction;

    fn mul(self, rhs: MeanFunction) -> MeanFunction {
        MeanFunction::Prod(Prod::new(self, rhs))
    }
}
