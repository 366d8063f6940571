//! Evaluation hooks for observability.
//!
//! Hooks observe a tree walk without changing it. Pass one to
//! [`MeanFunction::evaluate_with_hook`](crate::MeanFunction::evaluate_with_hook).
//!
//! ## Events
//!
//! - `on_node_start`: Before a node evaluates (parents before children)
//! - `on_node_end`: After a node produced its vector (children before parents)
//! - `on_error`: When a node fails, and for each ancestor the error passes through
//!
//! `depth` is 0 for the root and grows by one per combinator level.
//!
//! ## Example
//!
//! ```rust
//! use compositional_gp::hooks::LoggingHook;
//! use compositional_gp::{Constant, Zero};
//! use ndarray::array;
//!
//! let mean = Zero + Constant::new(5.0);
//! let x = array![[1.0], [2.0]];
//! // [Mean] add ...
//! // [Mean]   zero ...
//! let m = mean.evaluate_with_hook(x.view(), &LoggingHook::new()).unwrap();
//! assert_eq!(m, array![5.0, 5.0]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array1;

use crate::error::MeanError;

// ============================================================================
// Eval Hook Trait
// ============================================================================

/// Trait for observing mean-function evaluation.
///
/// All methods have default no-op implementations.
pub trait EvalHook: Send + Sync {
    /// Called before a node evaluates.
    fn on_node_start(&self, _name: &str, _depth: usize) {}

    /// Called after a node evaluated successfully.
    fn on_node_end(&self, _name: &str, _depth: usize, _output: &Array1<f64>) {}

    /// Called when a node's evaluation failed.
    fn on_error(&self, _name: &str, _depth: usize, _error: &MeanError) {}
}

/// A no-op hook for when no observation is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl EvalHook for NullHook {}

// ============================================================================
// Logging Hook
// ============================================================================

/// A hook that logs every node to stdout, indented by tree depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook {
    /// Also print each node's output vector
    pub verbose: bool,
}

impl LoggingHook {
    /// Create a new logging hook.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a logging hook that also prints output vectors.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl EvalHook for LoggingHook {
    fn on_node_start(&self, name: &str, depth: usize) {
        println!("[Mean] {}{} ...", "  ".repeat(depth), name);
    }

    fn on_node_end(&self, name: &str, depth: usize, output: &Array1<f64>) {
        println!(
            "[Mean] {}{} -> {} value(s)",
            "  ".repeat(depth),
            name,
            output.len()
        );
        if self.verbose {
            println!("       {}{}", "  ".repeat(depth), output);
        }
    }

    fn on_error(&self, name: &str, depth: usize, error: &MeanError) {
        println!("[Mean] {}{} failed: {}", "  ".repeat(depth), name, error);
    }
}

// ============================================================================
// Counting Hook
// ============================================================================

/// A hook that counts visited, finished, and failed nodes.
#[derive(Debug, Default)]
pub struct CountingHook {
    started: AtomicUsize,
    finished: AtomicUsize,
    failed: AtomicUsize,
}

impl CountingHook {
    /// Create a counting hook with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes that began evaluating.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Nodes that produced a vector.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// Nodes that reported an error.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

impl EvalHook for CountingHook {
    fn on_node_start(&self, _name: &str, _depth: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_node_end(&self, _name: &str, _depth: usize, _output: &Array1<f64>) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _name: &str, _depth: usize, _error: &MeanError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Composite Hook
// ============================================================================

/// A hook that delegates to multiple inner hooks.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Box<dyn EvalHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the composite.
    pub fn with<H: EvalHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }
}

impl EvalHook for CompositeHook {
    fn on_node_start(&self, name: &str, depth: usize) {
        for hook in &self.hooks {
            hook.on_node_start(name, depth);
        }
    }

    fn on_node_end(&self, name: &str, depth: usize, output: &Array1<f64>) {
        for hook in &self.hooks {
            hook.on_node_end(name, depth, output);
        }
    }

    fn on_error(&self, name: &str, depth: usize, error: &MeanError) {
        for hook in &self.hooks {
            hook.on_error(name, depth, error);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::MeanFunction;
    use crate::mean::{Constant, Linear, Zero};
    use ndarray::array;
    use std::sync::{Arc, Mutex};

    /// Records `(event, name, depth)` triples in call order.
    #[derive(Default)]
    struct RecordingHook {
        events: Arc<Mutex<Vec<(&'static str, String, usize)>>>,
    }

    impl RecordingHook {
        fn record(&self, event: &'static str, name: &str, depth: usize) {
            if let Ok(mut events) = self.events.lock() {
                events.push((event, name.to_string(), depth));
            }
        }
    }

    impl EvalHook for RecordingHook {
        fn on_node_start(&self, name: &str, depth: usize) {
            self.record("start", name, depth);
        }

        fn on_node_end(&self, name: &str, depth: usize, _output: &Array1<f64>) {
            self.record("end", name, depth);
        }

        fn on_error(&self, name: &str, depth: usize, _error: &MeanError) {
            self.record("error", name, depth);
        }
    }

    #[test]
    fn test_null_hook() {
        let hook = NullHook;
        // Should not panic
        hook.on_node_start("zero", 0);
        hook.on_node_end("zero", 0, &array![0.0]);
    }

    #[test]
    fn test_event_order() {
        let hook = RecordingHook::default();
        let events = Arc::clone(&hook.events);
        let x = array![[1.0], [2.0]];

        let mean = Zero + Constant::new(1.0);
        mean.evaluate_with_hook(x.view(), &hook).unwrap();

        let events = events.lock().unwrap();
        let expected = vec![
            ("start", "add".to_string(), 0),
            ("start", "zero".to_string(), 1),
            ("end", "zero".to_string(), 1),
            ("start", "constant".to_string(), 1),
            ("end", "constant".to_string(), 1),
            ("end", "add".to_string(), 0),
        ];
        assert_eq!(*events, expected);
    }

    #[test]
    fn test_counting_hook() {
        let hook = CountingHook::new();
        let x = array![[1.0, 2.0], [3.0, 4.0]];

        let mean = (Zero + Constant::new(1.0)) * Linear::new(array![1.0, 1.0]);
        mean.evaluate_with_hook(x.view(), &hook).unwrap();

        assert_eq!(hook.started(), 5);
        assert_eq!(hook.finished(), 5);
        assert_eq!(hook.failed(), 0);
    }

    #[test]
    fn test_error_reported_up_the_tree() {
        let hook = CountingHook::new();
        let x = array![[1.0, 2.0], [3.0, 4.0]];

        // Right branch never runs once the left branch fails.
        let mean = (Zero + Linear::new(array![1.0])) * Constant::new(2.0);
        let result = mean.evaluate_with_hook(x.view(), &hook);

        assert!(matches!(result, Err(MeanError::ShapeMismatch { op: "linear", .. })));
        assert_eq!(hook.started(), 4);
        assert_eq!(hook.finished(), 1);
        assert_eq!(hook.failed(), 3);
    }

    #[test]
    fn test_composite_hook() {
        let first = RecordingHook::default();
        let second = RecordingHook::default();
        let first_events = Arc::clone(&first.events);
        let second_events = Arc::clone(&second.events);

        let composite = CompositeHook::new().with(first).with(second);
        let x = array![[1.0]];
        MeanFunction::Zero
            .evaluate_with_hook(x.view(), &composite)
            .unwrap();

        assert_eq!(first_events.lock().unwrap().len(), 2);
        assert_eq!(second_events.lock().unwrap().len(), 2);
    }
}
