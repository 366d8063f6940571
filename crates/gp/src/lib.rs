//! # GP - Composable Mean Functions
//!
//! A Gaussian process prior is a mean function plus a covariance kernel.
//! This crate provides the mean side as an algebra: small mean functions
//! combine with `+` and `*` into bigger ones, and the result is itself a
//! mean function.
//!
//! ## Core Concepts
//!
//! - **A mean function is a morphism** `X (n × k) → m (n)`
//! - **Leaves**: [`Zero`], [`Constant`], [`Linear`]
//! - **Combinators**: [`Add`] and [`Prod`] evaluate both children on the same
//!   input and merge pointwise
//! - **Composition is construction**: `a + b` builds a tree; nothing runs until
//!   [`Mean::evaluate`]
//!
//! ## Example: Linear Trend with an Offset
//!
//! ```rust
//! use compositional_gp::{Constant, Linear, Mean, Zero};
//! use ndarray::array;
//!
//! let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
//!
//! let trend = Linear::new(array![1.0, 1.0]);
//! assert_eq!(trend.evaluate(x.view()).unwrap(), array![3.0, 7.0, 11.0]);
//!
//! let shifted = Zero + Constant::new(5.0);
//! assert_eq!(shifted.evaluate(x.view()).unwrap(), array![5.0, 5.0, 5.0]);
//!
//! // Shape errors surface instead of panicking
//! let wrong = Linear::new(array![1.0, 1.0, 1.0]);
//! assert!(wrong.evaluate(x.view()).is_err());
//! ```

pub mod combinator;
pub mod config;
mod error;
pub mod function;
pub mod hooks;
pub mod mean;
pub mod trace;

pub use combinator::{Add, Prod};
pub use config::{CoeffsConfig, MeanConfig, ValueConfig, MAX_CONFIG_DEPTH};
pub use error::MeanError;
pub use function::MeanFunction;
pub use hooks::{EvalHook, LoggingHook, NullHook};
pub use mean::{Constant, Linear, Mean, Zero};
pub use trace::{TraceHook, TraceNode};

/// Tolerance for comparing mean vectors built along different paths.
pub const MEAN_TOLERANCE: f64 = 1e-9;
