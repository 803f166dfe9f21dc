//! Tour Optimizer Library
//!
//! Finds a low-cost visiting order over a small set of locations (2 to 10) given a
//! pairwise distance matrix. The depot is location 0 and always comes first; the result
//! is either a closed round trip or an open path ending at the last stop.
//!
//! # Features
//!
//! - Path-cheapest-arc and cheapest-insertion construction
//! - Local search methods (2-opt, relocation, Or-opt, swap, VND)
//! - Guided local search under a wall-clock budget, with a safe fallback order
//! - Exhaustive reference solver for small instances
//! - Benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use tour_optimizer::config::SolverConfig;
//! use tour_optimizer::optimizer::Optimizer;
//! use tour_optimizer::request::OptimizationRequest;
//!
//! let request = OptimizationRequest::from_file("request.json").unwrap();
//! let optimizer = Optimizer::with_config(SolverConfig::default());
//! let outcome = optimizer.solve_request(&request).unwrap();
//!
//! println!("Order: {:?}, distance: {}", outcome.optimized_order, outcome.total_distance);
//! ```

pub mod benchmark;
pub mod config;
pub mod error;
pub mod exact;
pub mod extract;
pub mod heuristics;
pub mod instance;
pub mod optimizer;
pub mod request;
pub mod solution;
pub mod termination;

pub use config::SolverConfig;
pub use error::OptimizeError;
pub use instance::RoutingInstance;
pub use optimizer::{solve_tsp, Optimizer};
pub use request::OptimizationRequest;
pub use solution::{Solution, SolveOutcome};
