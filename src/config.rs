//! Configuration parameters for the AILS search.
//!
//! Defaults follow the published AILS-II parameter set. A configuration can
//! be read from JSON, tweaked with the `with_*` builders and is checked by
//! [`Config::validate`] before a search starts.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the execution limit is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoppingCriterion {
    /// Limit counts perturbation iterations
    Iteration,
    /// Limit counts wall-clock seconds
    Time,
}

/// Destroy patterns available to the perturbation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerturbationKind {
    /// Remove a chain of consecutive customers
    Sequential,
    /// Remove the nearest neighbours of a random customer
    Concentric,
}

/// Repair rules used to reinsert removed customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertionHeuristic {
    /// Insert next to the closest placed neighbour
    Distance,
    /// Insert next to the cheapest of the first `varphi` placed neighbours
    Cost,
}

impl fmt::Display for PerturbationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerturbationKind::Sequential => write!(f, "Sequential"),
            PerturbationKind::Concentric => write!(f, "Concentric"),
        }
    }
}

impl FromStr for PerturbationKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(PerturbationKind::Sequential),
            "concentric" => Ok(PerturbationKind::Concentric),
            other => Err(SolverError::InvalidConfig(format!("unknown perturbation '{}'", other))),
        }
    }
}

impl fmt::Display for InsertionHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertionHeuristic::Distance => write!(f, "Distance"),
            InsertionHeuristic::Cost => write!(f, "Cost"),
        }
    }
}

impl FromStr for InsertionHeuristic {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(InsertionHeuristic::Distance),
            "cost" => Ok(InsertionHeuristic::Cost),
            other => Err(SolverError::InvalidConfig(format!(
                "unknown insertion heuristic '{}'",
                other
            ))),
        }
    }
}

/// Configuration settings for the AILS search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tolerance for cost comparisons
    pub epsilon: f64,
    /// Number of nearest neighbours explored by local search and the Cost insertion
    pub varphi: usize,
    /// Window of the moving averages and period of controller updates
    pub gamma: usize,
    /// Final acceptance strictness
    pub eta_min: f64,
    /// Initial acceptance strictness
    pub eta_max: f64,
    /// Lower bound of the ideal distance
    pub d_min: f64,
    /// Upper bound (and start value) of the ideal distance
    pub d_max: f64,
    /// Nearest neighbours the search considers per node; longer instance
    /// lists are truncated, shorter ones are used as they are
    pub knn_limit: usize,
    /// Unit of the execution limit
    pub stopping_criterion: StoppingCriterion,
    /// Perturbation operators drawn uniformly each iteration
    pub perturbations: Vec<PerturbationKind>,
    /// Insertion heuristics drawn uniformly each perturbation
    pub insertion_heuristics: Vec<InsertionHeuristic>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            epsilon: 0.01,
            varphi: 40,
            gamma: 30,
            eta_min: 0.01,
            eta_max: 1.0,
            d_min: 15.0,
            d_max: 30.0,
            knn_limit: 100,
            stopping_criterion: StoppingCriterion::Iteration,
            perturbations: vec![PerturbationKind::Sequential, PerturbationKind::Concentric],
            insertion_heuristics: vec![InsertionHeuristic::Distance, InsertionHeuristic::Cost],
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| SolverError::InvalidConfig(e.to_string()))
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_varphi(mut self, varphi: usize) -> Self {
        self.varphi = varphi;
        self
    }

    pub fn with_gamma(mut self, gamma: usize) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the acceptance strictness range.
    pub fn with_eta(mut self, eta_min: f64, eta_max: f64) -> Self {
        self.eta_min = eta_min;
        self.eta_max = eta_max;
        self
    }

    /// Set the ideal distance range.
    pub fn with_distance_range(mut self, d_min: f64, d_max: f64) -> Self {
        self.d_min = d_min;
        self.d_max = d_max;
        self
    }

    pub fn with_knn_limit(mut self, limit: usize) -> Self {
        self.knn_limit = limit;
        self
    }

    pub fn with_stopping_criterion(mut self, criterion: StoppingCriterion) -> Self {
        self.stopping_criterion = criterion;
        self
    }

    pub fn with_perturbations(mut self, kinds: Vec<PerturbationKind>) -> Self {
        self.perturbations = kinds;
        self
    }

    pub fn with_insertion_heuristics(mut self, heuristics: Vec<InsertionHeuristic>) -> Self {
        self.insertion_heuristics = heuristics;
        self
    }

    /// Reject parameter sets the controllers cannot work with.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SolverError::InvalidConfig(msg));

        if self.gamma == 0 {
            return fail("gamma must be at least 1".to_string());
        }
        if self.varphi == 0 {
            return fail("varphi must be at least 1".to_string());
        }
        if self.knn_limit == 0 {
            return fail("knn_limit must be at least 1".to_string());
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return fail(format!("epsilon must be a non-negative number, got {}", self.epsilon));
        }
        if !(self.eta_min > 0.0 && self.eta_min <= self.eta_max && self.eta_max.is_finite()) {
            return fail(format!(
                "eta range must satisfy 0 < eta_min <= eta_max, got {}..{}",
                self.eta_min, self.eta_max
            ));
        }
        if !(self.d_min > 0.0 && self.d_min <= self.d_max && self.d_max.is_finite()) {
            return fail(format!(
                "distance range must satisfy 0 < d_min <= d_max, got {}..{}",
                self.d_min, self.d_max
            ));
        }
        if self.perturbations.is_empty() {
            return fail("at least one perturbation operator is required".to_string());
        }
        if self.insertion_heuristics.is_empty() {
            return fail("at least one insertion heuristic is required".to_string());
        }
        let mut seen = HashSet::new();
        if let Some(kind) = self.perturbations.iter().find(|&&k| !seen.insert(k)) {
            return fail(format!("perturbation {} is listed twice", kind));
        }
        Ok(())
    }
}

/// When a run stops
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunLimits {
    /// Iterations or seconds, depending on the stopping criterion
    pub execution_limit: f64,
    /// Stop as soon as a solution at least this good is found
    pub optimal: Option<f64>,
}

impl RunLimits {
    pub fn new(execution_limit: f64) -> Self {
        RunLimits { execution_limit, optimal: None }
    }

    pub fn with_optimal(mut self, optimal: f64) -> Self {
        self.optimal = Some(optimal);
        self
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        RunLimits::new(10_000.0)
    }
}
