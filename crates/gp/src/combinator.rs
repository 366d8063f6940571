//! # Combinators
//!
//! Two mean functions combine pointwise into a new one:
//!
//! ```text
//!          ┌──────┐
//!    X ─┬─▶│ left │──┐
//!       │  └──────┘  │  ┌─────┐
//!       │            ├─▶│ +/× │────▶ m
//!       │  ┌───────┐ │  └─────┘
//!       └─▶│ right │─┘
//!          └───────┘
//! ```
//!
//! Both branches see the same input. Each combinator owns its children, so
//! a composed mean function is always a tree.

use std::fmt;

use ndarray::{Array1, ArrayView2};

use crate::error::MeanError;
use crate::function::MeanFunction;
use crate::hooks::{EvalHook, NullHook};
use crate::mean::Mean;

fn check_lengths(
    op: &'static str,
    left: &Array1<f64>,
    right: &Array1<f64>,
) -> Result<(), MeanError> {
    if left.len() != right.len() {
        return Err(MeanError::shape(op, left.shape(), right.shape()));
    }
    Ok(())
}

/// Evaluate both branches at `depth`, left first. A failing left branch
/// stops the walk before the right one starts.
fn eval_children(
    left: &MeanFunction,
    right: &MeanFunction,
    x: ArrayView2<'_, f64>,
    hook: &dyn EvalHook,
    depth: usize,
) -> Result<(Array1<f64>, Array1<f64>), MeanError> {
    let left = left.eval_node(x, hook, depth)?;
    let right = right.eval_node(x, hook, depth)?;
    Ok((left, right))
}

/// Pointwise sum of two mean functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Add {
    pub left: Box<MeanFunction>,
    pub right: Box<MeanFunction>,
}

impl Add {
    /// Wrap two mean functions. Nothing is evaluated.
    pub fn new(left: impl Into<MeanFunction>, right: impl Into<MeanFunction>) -> Self {
        Self {
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Evaluate the children at `depth` and sum them.
    pub(crate) fn eval_with(
        &self,
        x: ArrayView2<'_, f64>,
        hook: &dyn EvalHook,
        depth: usize,
    ) -> Result<Array1<f64>, MeanError> {
        let (left, right) = eval_children(&self.left, &self.right, x, hook, depth)?;
        Self::combine(left, right)
    }

    /// Sum two already-evaluated branches.
    pub(crate) fn combine(left: Array1<f64>, right: Array1<f64>) -> Result<Array1<f64>, MeanError> {
        check_lengths("add", &left, &right)?;
        Ok(left + &right)
    }
}

impl Mean for Add {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        self.eval_with(x, &NullHook, 1)
    }

    fn name(&self) -> &'static str {
        "add"
    }
}

impl fmt::Display for Add {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} + {})", self.left, self.right)
    }
}

/// Pointwise product of two mean functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Prod {
    pub left: Box<MeanFunction>,
    pub right: Box<MeanFunction>,
}

impl Prod {
    /// Wrap two mean functions. Nothing is evaluated.
    pub fn new(left: impl Into<MeanFunction>, right: impl Into<MeanFunction>) -> Self {
        Self {
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub(crate) fn eval_with(
        &self,
        x: ArrayView2<'_, f64>,
        hook: &dyn EvalHook,
        depth: usize,
    ) -> Result<Array1<f64>, MeanError> {
        let (left, right) = eval_children(&self.left, &self.right, x, hook, depth)?;
        Self::combine(left, right)
    }

    /// Multiply two already-evaluated branches.
    pub(crate) fn combine(left: Array1<f64>, right: Array1<f64>) -> Result<Array1<f64>, MeanError> {
        check_lengths("prod", &left, &right)?;
        Ok(left * &right)
    }
}

impl Mean for Prod {
    fn evaluate(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, MeanError> {
        self.eval_with(x, &NullHook, 1)
    }

    fn name(&self) -> &'static str {
        "prod"
    }
}

impl fmt::Display for Prod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} * {})", self.left, self.right)
    }
}
