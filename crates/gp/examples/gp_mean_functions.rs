//! Composable Gaussian Process Mean Functions
//!
//! Run with: cargo run -p compositional-gp --example gp_mean_functions
//!
//! This example demonstrates:
//! - The three leaf mean functions on a small input
//! - Building trees with `+` and `*`
//! - Shape errors surfacing as values
//! - Observing evaluation with hooks and traces
//! - Loading a mean function from JSON

use compositional_gp::hooks::LoggingHook;
use compositional_gp::{Constant, Linear, Mean, MeanFunction, Zero};
use ndarray::array;

fn main() {
    println!("=== Composable GP Mean Functions ===\n");

    let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    println!("Input X (3 points, 2 features):\n{}\n", x);

    // -------------------------------------------------------------------------
    // 1. Leaves
    // -------------------------------------------------------------------------
    println!("1. Leaves");
    println!("---------\n");

    let linear = Linear::new(array![1.0, 1.0]);
    for mean in [
        MeanFunction::from(Zero),
        Constant::new(5.0).into(),
        linear.clone().into(),
    ] {
        match mean.evaluate(x.view()) {
            Ok(m) => println!("  {:<16} -> {}", mean.to_string(), m),
            Err(e) => println!("  {:<16} -> error: {}", mean.to_string(), e),
        }
    }
    println!();

    // -------------------------------------------------------------------------
    // 2. Composition
    // -------------------------------------------------------------------------
    println!("2. Composition");
    println!("--------------\n");

    let shifted = Zero + Constant::new(5.0);
    let scaled_trend = linear.clone() * 0.5 + 1.0;
    for mean in [&shifted, &scaled_trend] {
        match mean.evaluate(x.view()) {
            Ok(m) => println!("  {} -> {}", mean, m),
            Err(e) => println!("  {} -> error: {}", mean, e),
        }
    }
    println!(
        "  (trees: {} and {} nodes, nothing evaluated until asked)\n",
        shifted.n_nodes(),
        scaled_trend.n_nodes()
    );

    // -------------------------------------------------------------------------
    // 3. Shape errors
    // -------------------------------------------------------------------------
    println!("3. Shape Errors");
    println!("---------------\n");

    let wrong = Linear::new(array![1.0, 1.0, 1.0]);
    match wrong.evaluate(x.view()) {
        Ok(m) => println!("  unexpected success: {}", m),
        Err(e) => println!("  {} on 3×2 input: {}\n", wrong, e),
    }

    // -------------------------------------------------------------------------
    // 4. Observing evaluation
    // -------------------------------------------------------------------------
    println!("4. Hooks and Traces");
    println!("-------------------\n");

    if let Err(e) = scaled_trend.evaluate_with_hook(x.view(), &LoggingHook::verbose()) {
        println!("  error: {}", e);
    }
    println!();

    match scaled_trend.evaluate_traced(x.view()) {
        Ok((_, trace)) => print!("{}", trace.display()),
        Err(e) => println!("  error: {}", e),
    }
    println!();

    // -------------------------------------------------------------------------
    // 5. Configuration
    // -------------------------------------------------------------------------
    println!("5. JSON Configuration");
    println!("---------------------\n");

    let json = r#"{
        "type": "add",
        "left":  {"type": "linear", "coeffs": [[1.0], [1.0]], "intercept": 0.5},
        "right": {"type": "constant", "c": 5}
    }"#;
    match MeanFunction::from_json(json) {
        Ok(mean) => {
            println!("  Loaded: {}", mean);
            match mean.evaluate(x.view()) {
                Ok(m) => println!("  Values: {}", m),
                Err(e) => println!("  error: {}", e),
            }
            match mean.to_config().to_json() {
                Ok(text) => println!("  Round trip:\n{}", text),
                Err(e) => println!("  error: {}", e),
            }
        }
        Err(e) => println!("  error: {}", e),
    }

    println!("\n=== Done ===");
}
