//! Adaptive Iterated Local Search (AILS) driver.
//!
//! Each iteration perturbs a copy of the reference solution, repairs and
//! re-optimizes it, then feeds the outcome to the diversity controllers and
//! the acceptance criterion, which decides whether it becomes the new
//! reference.

use crate::config::{Config, RunLimits, StoppingCriterion};
use crate::diversity::{pairwise_distance, AcceptanceCriterion, DistAdjustment, IdealDist};
use crate::error::{Result, SolverError};
use crate::heuristics::construction::{ConstructionHeuristic, RandomizedInsertion};
use crate::heuristics::feasibility::FeasibilityPhase;
use crate::heuristics::local_search::LocalSearch;
use crate::heuristics::perturbation::{build_perturbations, Perturbation};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Summary of a finished search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub instance: String,
    pub seed: u64,
    pub best_cost: f64,
    pub num_routes: usize,
    pub routes: Vec<Vec<usize>>,
    pub feasible: bool,
    /// Perturbation iterations performed
    pub iterations: usize,
    /// Iteration of the last improvement of the best solution
    pub iteration_best: usize,
    /// Seconds until the last improvement
    pub time_best: f64,
    pub total_time: f64,
    /// `iteration_best / iterations`
    pub convergence_iteration: f64,
    /// `time_best / total_time`
    pub convergence_time: f64,
    /// Percentage above the supplied optimal cost
    pub gap: Option<f64>,
}

/// AILS search state for one instance and one seed.
pub struct Ails<'a> {
    instance: &'a Instance,
    config: Config,
    limits: RunLimits,
    seed: u64,
    rng: ChaCha8Rng,

    solution: Solution,
    reference: Solution,
    best: Solution,
    best_f: f64,

    construction: RandomizedInsertion,
    feasibility: FeasibilityPhase,
    local_search: LocalSearch,
    perturbations: Vec<Perturbation>,
    dist_adjustment: DistAdjustment,
    acceptance: AcceptanceCriterion,

    iterations: usize,
    iteration_best: usize,
    time_best: f64,
    total_time: f64,
}

impl<'a> Ails<'a> {
    pub fn new(instance: &'a Instance, config: Config, limits: RunLimits, seed: u64) -> Result<Self> {
        config.validate()?;
        if !limits.execution_limit.is_finite() || limits.execution_limit < 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "execution limit must be a non-negative number, got {}",
                limits.execution_limit
            )));
        }

        let wanted = config.knn_limit.min(instance.num_customers());
        if instance.knn_len() < wanted {
            log::warn!(
                "instance neighbour lists hold {} entries, knn_limit asks for {}",
                instance.knn_len(),
                config.knn_limit
            );
        }

        let ideal = IdealDist::default();
        let dist_adjustment = DistAdjustment::new(ideal.clone(), &config, limits.execution_limit);
        let perturbations = build_perturbations(instance, &config, &ideal);

        Ok(Ails {
            instance,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            solution: Solution::new(instance),
            reference: Solution::new(instance),
            best: Solution::new(instance),
            best_f: f64::MAX,
            construction: RandomizedInsertion::new(),
            feasibility: FeasibilityPhase::new(instance, &config),
            local_search: LocalSearch::new(instance, &config),
            perturbations,
            dist_adjustment,
            acceptance: AcceptanceCriterion::new(&config, limits.execution_limit),
            config,
            limits,
            iterations: 0,
            iteration_best: 0,
            time_best: 0.0,
            total_time: 0.0,
        })
    }

    /// Run the search until the execution limit or the optimal bound is reached.
    pub fn search(&mut self) -> Result<SearchResult> {
        let instance = self.instance;
        let started = Instant::now();

        self.construction.construct(instance, &mut self.reference, &mut self.rng);
        self.feasibility.make_feasible(instance, &mut self.reference)?;
        self.local_search.local_search(instance, &mut self.reference, true);
        self.reference.debug_audit(instance, self.audit_tolerance(), "initial solution", true);

        self.best.copy_from(&self.reference);
        self.best_f = self.reference.f;
        self.time_best = started.elapsed().as_secs_f64();
        log::info!(
            "initial solution: cost {:.2}, {} routes",
            self.best_f,
            self.best.num_routes()
        );

        while !self.should_stop(&started) {
            self.iterations += 1;
            self.solution.copy_from(&self.reference);

            let op = self.rng.gen_range(0..self.perturbations.len());
            self.perturbations[op].apply(instance, &mut self.solution, &mut self.rng);
            self.feasibility.make_feasible(instance, &mut self.solution)?;
            self.local_search.local_search(instance, &mut self.solution, true);
            self.solution.debug_audit(instance, self.audit_tolerance(), "local search", true);

            let distance = pairwise_distance(&self.solution, &self.reference) as f64;
            self.update_best(op, &started);
            self.dist_adjustment.adjust();
            self.perturbations[op].omega_mut().record_distance(distance);

            if self.acceptance.accept(self.solution.f) {
                self.reference.copy_from(&self.solution);
            }
        }

        self.total_time = started.elapsed().as_secs_f64();
        log::info!(
            "search finished: cost {:.2}, {} iterations, {:.2}s",
            self.best_f,
            self.iterations,
            self.total_time
        );
        Ok(self.result())
    }

    fn update_best(&mut self, op: usize, started: &Instant) {
        if self.solution.f - self.best_f >= -self.config.epsilon {
            return;
        }
        self.best_f = self.solution.f;
        self.best.copy_from(&self.solution);
        self.iteration_best = self.iterations;
        self.time_best = started.elapsed().as_secs_f64();

        let gap = self.gap().map(|g| format!("{:.4}%", g)).unwrap_or_else(|| "-".to_string());
        log::info!(
            "solution quality: {:.2} gap: {} K: {} iteration: {} eta: {:.4} omega: {:.4} time: {:.3}",
            self.best_f,
            gap,
            self.best.num_routes(),
            self.iterations,
            self.acceptance.eta(),
            self.perturbations[op].omega().omega(),
            self.time_best
        );
    }

    fn should_stop(&self, started: &Instant) -> bool {
        if let Some(optimal) = self.limits.optimal {
            if self.best_f - optimal <= self.config.epsilon {
                return true;
            }
        }
        match self.config.stopping_criterion {
            StoppingCriterion::Iteration => self.iterations as f64 >= self.limits.execution_limit,
            StoppingCriterion::Time => started.elapsed().as_secs_f64() >= self.limits.execution_limit,
        }
    }

    fn audit_tolerance(&self) -> f64 {
        1e-6 * self.reference.f.abs().max(1.0)
    }

    pub fn best_solution(&self) -> &Solution {
        &self.best
    }

    pub fn best_f(&self) -> f64 {
        self.best_f
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn perturbations(&self) -> &[Perturbation] {
        &self.perturbations
    }

    /// Percentage above the supplied optimal cost
    pub fn gap(&self) -> Option<f64> {
        self.limits
            .optimal
            .filter(|&o| o > 0.0)
            .map(|o| 100.0 * (self.best_f - o) / o)
    }

    pub fn result(&self) -> SearchResult {
        let ratio = |part: f64, whole: f64| if whole > 0.0 { part / whole } else { 0.0 };
        SearchResult {
            instance: self.instance.name.clone(),
            seed: self.seed,
            best_cost: self.best_f,
            num_routes: self.best.num_routes(),
            routes: self.best.to_routes(),
            feasible: self.best.is_feasible(),
            iterations: self.iterations,
            iteration_best: self.iteration_best,
            time_best: self.time_best,
            total_time: self.total_time,
            convergence_iteration: ratio(self.iteration_best as f64, self.iterations as f64),
            convergence_time: ratio(self.time_best, self.total_time),
            gap: self.gap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerturbationKind;
    use crate::instance::test_instances;

    #[test]
    fn test_six_customer_scenario() {
        let instance = test_instances::six_customers();
        let mut ails = Ails::new(&instance, Config::default(), RunLimits::new(50.0), 42).unwrap();
        let result = ails.search().unwrap();

        let best = ails.best_solution();
        assert!(result.feasible);
        assert_eq!(best.infeasibility(), 0);
        assert!(result.num_routes >= 2);
        assert!(best.audit(&instance, 1e-6, true, true).is_ok());
        assert!((best.f - result.best_cost).abs() < 1e-9);
        assert_eq!(result.iterations, 50);
    }

    #[test]
    fn test_zero_iteration_limit_returns_initial_solution() {
        let instance = test_instances::scattered(20, 30);
        let mut ails = Ails::new(&instance, Config::default(), RunLimits::new(0.0), 3).unwrap();
        let result = ails.search().unwrap();

        assert_eq!(result.iterations, 0);
        assert_eq!(result.iteration_best, 0);
        assert_eq!(result.convergence_iteration, 0.0);
        assert!(ails.best_solution().audit(&instance, 1e-6, true, true).is_ok());
        assert!(ails.perturbations().iter().all(|p| p.count_candidates() == 0));
    }

    #[test]
    fn test_stops_at_optimal_bound() {
        let instance = test_instances::six_customers();
        // Any solution reaches this bound
        let limits = RunLimits::new(1000.0).with_optimal(1e9);
        let mut ails = Ails::new(&instance, Config::default(), limits, 1).unwrap();
        let result = ails.search().unwrap();
        assert_eq!(result.iterations, 0);
        assert!(result.gap.unwrap() < 0.0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let instance = test_instances::scattered(25, 25);
        let run = |seed| {
            let mut ails = Ails::new(&instance, Config::default(), RunLimits::new(30.0), seed).unwrap();
            ails.search().unwrap().routes
        };
        assert_eq!(run(8), run(8));
    }

    #[test]
    fn test_improves_on_scattered_instance() {
        let instance = test_instances::scattered(40, 30);
        let config = Config::default().with_gamma(10);
        let mut ails = Ails::new(&instance, config, RunLimits::new(200.0), 5).unwrap();
        let result = ails.search().unwrap();

        assert!(result.feasible);
        assert!(ails.best_solution().audit(&instance, 1e-6, true, true).is_ok());
        assert!(result.iteration_best <= result.iterations);
        assert!(result.best_cost <= ails.reference.f + 0.01 + 1e-9);
    }

    #[test]
    fn test_stops_within_epsilon_of_optimal_bound() {
        let instance = test_instances::scattered(20, 30);
        let mut first = Ails::new(&instance, Config::default(), RunLimits::new(0.0), 4).unwrap();
        let initial = first.search().unwrap().best_cost;

        // The same seed rebuilds the same initial solution, which sits just above the bound
        let limits = RunLimits::new(1000.0).with_optimal(initial - 0.5 * Config::default().epsilon);
        let mut ails = Ails::new(&instance, Config::default(), limits, 4).unwrap();
        let result = ails.search().unwrap();
        assert_eq!(result.iterations, 0);
        assert!((result.best_cost - initial).abs() < 1e-9);
    }

    #[test]
    fn test_time_limited_run() {
        let instance = test_instances::scattered(30, 30);
        let config = Config::default().with_stopping_criterion(StoppingCriterion::Time);
        let mut ails = Ails::new(&instance, config, RunLimits::new(0.2), 6).unwrap();
        let result = ails.search().unwrap();

        assert!(result.iterations > 0);
        assert!(result.total_time >= 0.2);
        assert!(result.total_time < 5.0);
        assert!(result.feasible);
        assert!(ails.best_solution().audit(&instance, 1e-6, true, true).is_ok());
    }

    #[test]
    fn test_short_neighbour_lists_from_config() {
        let instance = test_instances::scattered(25, 30);
        let config = Config::default().with_knn_limit(3).with_varphi(10);
        let mut ails = Ails::new(&instance, config, RunLimits::new(50.0), 2).unwrap();
        let result = ails.search().unwrap();

        assert!(result.feasible);
        assert_eq!(result.iterations, 50);
        assert!(ails.best_solution().audit(&instance, 1e-6, true, true).is_ok());
        assert!(ails
            .perturbations()
            .iter()
            .filter(|p| p.kind() == PerturbationKind::Concentric)
            .all(|p| p.count_candidates() <= 3));
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let instance = test_instances::six_customers();
        let config = Config::default().with_gamma(0);
        assert!(matches!(
            Ails::new(&instance, config, RunLimits::default(), 0),
            Err(SolverError::InvalidConfig(_))
        ));
        assert!(Ails::new(&instance, Config::default(), RunLimits::new(-1.0), 0).is_err());
    }
}
