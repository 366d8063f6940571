//! # Evaluation Traces
//!
//! [`MeanFunction::evaluate_traced`] returns the mean vector together with a
//! [`TraceNode`] tree mirroring the mean function: one node per sub-mean,
//! each with its wall-clock time and output length.
//!
//! ```rust
//! use compositional_gp::{Constant, Linear};
//! use ndarray::array;
//!
//! let mean = Linear::new(array![1.0, 1.0]) + Constant::new(1.0);
//! let x = array![[1.0, 2.0], [3.0, 4.0]];
//!
//! let (m, trace) = mean.evaluate_traced(x.view()).unwrap();
//! assert_eq!(m, array![4.0, 8.0]);
//! assert_eq!(trace.name, "add");
//! assert_eq!(trace.children.len(), 2);
//! println!("{}", trace.display());
//! ```
//!
//! The trace is recorded by [`TraceHook`], an [`EvalHook`] driven by the same
//! walk as [`MeanFunction::evaluate_with_hook`].

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ndarray::{Array1, ArrayView2};

use crate::error::MeanError;
use crate::function::MeanFunction;
use crate::hooks::EvalHook;
use crate::mean::Mean;

/// A node in the trace tree.
#[derive(Debug, Clone)]
pub struct TraceNode {
    /// Name of the mean function at this node
    pub name: String,
    /// Time spent in this node, children included
    pub duration: Duration,
    /// Length of the vector this node produced (0 if it failed)
    pub output_len: usize,
    /// Error this node failed with, if any
    pub error: Option<MeanError>,
    /// Child traces (empty for leaves)
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Create a trace node for a successful evaluation.
    pub fn new(name: impl Into<String>, duration: Duration, output_len: usize) -> Self {
        Self {
            name: name.into(),
            duration,
            output_len,
            error: None,
            children: Vec::new(),
        }
    }

    /// Create a trace node for a failed evaluation.
    pub fn failed(name: impl Into<String>, duration: Duration, error: MeanError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(name, duration, 0)
        }
    }

    /// Add a child trace.
    pub fn with_child(mut self, child: TraceNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of nodes in this trace, including itself.
    pub fn n_nodes(&self) -> usize {
        1 + self.children.iter().map(TraceNode::n_nodes).sum::<usize>()
    }

    /// Pretty-print the trace tree.
    pub fn display(&self) -> String {
        let mut out = String::new();
        self.display_indent(0, &mut out);
        out
    }

    fn display_indent(&self, indent: usize, out: &mut String) {
        let outcome = match &self.error {
            Some(error) => format!("failed: {}", error),
            None => self.output_len.to_string(),
        };
        out.push_str(&format!(
            "{}[{:?}] {} ({})\n",
            "  ".repeat(indent),
            self.duration,
            self.name,
            outcome
        ));
        for child in &self.children {
            child.display_indent(indent + 1, out);
        }
    }
}

impl fmt::Display for TraceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

// ============================================================================
// Trace Hook
// ============================================================================

struct OpenNode {
    name: String,
    start: Instant,
    children: Vec<TraceNode>,
}

#[derive(Default)]
struct TraceState {
    open: Vec<OpenNode>,
    root: Option<TraceNode>,
}

impl TraceState {
    fn close(&mut self, build: impl FnOnce(String, Duration) -> TraceNode) {
        let Some(node) = self.open.pop() else {
            return;
        };
        let mut trace = build(node.name, node.start.elapsed());
        trace.children = node.children;
        match self.open.last_mut() {
            Some(parent) => parent.children.push(trace),
            None => self.root = Some(trace),
        }
    }
}

/// A hook that builds a [`TraceNode`] tree while the walk runs.
///
/// Failed nodes stay in the trace, so the tree can be inspected after an
/// error too:
///
/// ```rust
/// use compositional_gp::trace::TraceHook;
/// use compositional_gp::{Linear, Zero};
/// use ndarray::array;
///
/// let mean = Zero + Linear::new(array![1.0]);
/// let x = array![[1.0, 2.0]];
///
/// let tracer = TraceHook::new();
/// assert!(mean.evaluate_with_hook(x.view(), &tracer).is_err());
///
/// let trace = tracer.into_trace().unwrap();
/// assert!(trace.is_error());
/// assert!(trace.children[1].is_error());
/// ```
#[derive(Default)]
pub struct TraceHook {
    state: Mutex<TraceState>,
}

impl TraceHook {
    /// Create an empty trace recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished trace, once the root node has ended or failed.
    pub fn into_trace(self) -> Option<TraceNode> {
        self.state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .root
    }

    fn with_state(&self, f: impl FnOnce(&mut TraceState)) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state);
    }
}

impl EvalHook for TraceHook {
    fn on_node_start(&self, name: &str, _depth: usize) {
        self.with_state(|state| {
            state.open.push(OpenNode {
                name: name.to_string(),
                start: Instant::now(),
                children: Vec::new(),
            })
        });
    }

    fn on_node_end(&self, _name: &str, _depth: usize, output: &Array1<f64>) {
        self.with_state(|state| {
            state.close(|name, duration| TraceNode::new(name, duration, output.len()))
        });
    }

    fn on_error(&self, _name: &str, _depth: usize, error: &MeanError) {
        self.with_state(|state| {
            state.close(|name, duration| TraceNode::failed(name, duration, error.clone()))
        });
    }
}

impl MeanFunction {
    /// Evaluate the tree and record how long each node took.
    ///
    /// On failure only the error is returned. Use [`TraceHook`] directly to
    /// keep the partial trace.
    pub fn evaluate_traced(
        &self,
        x: ArrayView2<'_, f64>,
    ) -> Result<(Array1<f64>, TraceNode), MeanError> {
        let tracer = TraceHook::new();
        let output = self.evaluate_with_hook(x, &tracer)?;
        let trace = tracer
            .into_trace()
            .unwrap_or_else(|| TraceNode::new(self.name(), Duration::ZERO, output.len()));
        Ok((output, trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mean::{Constant, Linear, Zero};
    use ndarray::array;

    #[test]
    fn test_trace_mirrors_tree() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let mean = (Zero + Constant::new(2.0)) * Linear::new(array![1.0, 1.0]);

        let (m, trace) = mean.evaluate_traced(x.view()).unwrap();
        assert_eq!(m, array![6.0, 14.0, 22.0]);

        assert_eq!(trace.name, "prod");
        assert_eq!(trace.output_len, 3);
        assert_eq!(trace.n_nodes(), mean.n_nodes());
        assert_eq!(trace.children[0].name, "add");
        assert_eq!(trace.children[0].children[0].name, "zero");
        assert_eq!(trace.children[1].name, "linear");
        assert!(trace.children[1].children.is_empty());
    }

    #[test]
    fn test_trace_matches_plain_evaluation() {
        let x = array![[0.5, -1.0], [2.0, 3.0]];
        let mean = Linear::new(array![2.0, 1.0]).with_intercept(1.0) * Constant::new(3.0);

        let (traced, _) = mean.evaluate_traced(x.view()).unwrap();
        assert_eq!(traced, mean.evaluate(x.view()).unwrap());
    }

    #[test]
    fn test_trace_error_propagates() {
        let x = array![[1.0, 2.0]];
        let mean = Zero + Linear::new(array![1.0]);
        assert!(mean.evaluate_traced(x.view()).is_err());
    }

    #[test]
    fn test_trace_hook_keeps_failing_node() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        // The constant branch never runs once the sum fails.
        let mean = (Zero + Linear::new(array![1.0])) * Constant::new(2.0);

        let tracer = TraceHook::new();
        let err = mean.evaluate_with_hook(x.view(), &tracer).unwrap_err();
        let trace = tracer.into_trace().unwrap();

        assert_eq!(trace.name, "prod");
        assert_eq!(trace.error, Some(err.clone()));
        assert_eq!(trace.n_nodes(), 4);

        let sum = &trace.children[0];
        assert!(!sum.children[0].is_error());
        assert_eq!(sum.children[0].output_len, 2);
        assert_eq!(sum.children[1].name, "linear");
        assert_eq!(sum.children[1].error, Some(err));
        assert!(trace.display().contains("linear (failed: Shape mismatch in linear"));
    }

    #[test]
    fn test_display_indents_children() {
        let trace = TraceNode::new("add", Duration::from_micros(3), 2)
            .with_child(TraceNode::new("zero", Duration::from_micros(1), 2));
        let text = trace.display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("add (2)"));
        assert!(lines[1].starts_with("  ["));
        assert!(lines[1].ends_with("zero (2)"));
    }
}
