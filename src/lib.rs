//! AILS-CVRP Solver Library
//!
//! Adaptive Iterated Local Search for the Capacitated Vehicle Routing Problem.
//!
//! # Features
//!
//! - CVRPLIB instance loading with precomputed nearest-neighbour lists
//! - Randomized insertion construction and capacity repair
//! - Inter-route local search over SHIFT, SWAP, SWAP*, CROSS and 2-opt moves
//! - Concentric and Sequential ruin-and-recreate perturbations
//! - Adaptive perturbation strength and threshold acceptance
//! - Benchmarking and SVG visualization tools
//!
//! # Example
//!
//! ```no_run
//! use ails_cvrp::{Ails, Config, Instance, RunLimits};
//!
//! let config = Config::default();
//! let instance = Instance::from_file("X-n101-k25.vrp")
//!     .unwrap()
//!     .with_knn_limit(config.knn_limit);
//!
//! let mut ails = Ails::new(&instance, config, RunLimits::new(5000.0), 0).unwrap();
//! let result = ails.search().unwrap();
//!
//! println!("{}", ails.best_solution());
//! println!("Best cost: {:.2} after {} iterations", result.best_cost, result.iterations);
//! ```

pub mod error;
pub mod instance;
pub mod config;
pub mod solution;
pub mod heuristics;
pub mod diversity;
pub mod ails;
pub mod benchmark;
pub mod visualization;

pub use ails::{Ails, SearchResult};
pub use config::{Config, RunLimits};
pub use error::SolverError;
pub use instance::Instance;
pub use solution::Solution;
