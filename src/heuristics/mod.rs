//! Heuristics module for the CVRP.
//!
//! This module exports the construction, improvement, repair and
//! perturbation heuristics driven by the AILS search.

pub mod candidate;
pub mod construction;
pub mod feasibility;
pub mod intra_route;
pub mod local_search;
pub mod moves;
pub mod perturbation;

pub use candidate::{CandidateMatrix, CandidateNode, MoveType};
pub use construction::{ConstructionHeuristic, RandomizedInsertion};
pub use feasibility::FeasibilityPhase;
pub use intra_route::IntraLocalSearch;
pub use local_search::{LocalSearch, SearchMode};
pub use moves::MoveExecutor;
pub use perturbation::{build_perturbations, removal_strategy, Perturbation, RemovalStrategy};
