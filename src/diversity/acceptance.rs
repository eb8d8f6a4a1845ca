//! Threshold acceptance of re-optimized solutions.

use super::{decay_factor, projected_iterations, MovingAverage};
use crate::config::{Config, StoppingCriterion};
use std::time::Instant;

/// Accepts a candidate when its cost is below a threshold placed between the
/// best recent cost and the average recent cost. `eta` moves the threshold
/// from the average (permissive) toward the best (strict) over the run.
pub struct AcceptanceCriterion {
    eta: f64,
    eta_min: f64,
    eta_max: f64,
    alpha: f64,
    gamma: usize,
    criterion: StoppingCriterion,
    execution_limit: f64,
    average: MovingAverage,
    upper_limit: f64,
    updated_upper_limit: f64,
    threshold: f64,
    iterations: usize,
    started: Option<Instant>,
}

impl AcceptanceCriterion {
    pub fn new(config: &Config, execution_limit: f64) -> Self {
        AcceptanceCriterion {
            eta: config.eta_max,
            eta_min: config.eta_min,
            eta_max: config.eta_max,
            alpha: 1.0,
            gamma: config.gamma.max(1),
            criterion: config.stopping_criterion,
            execution_limit,
            average: MovingAverage::new(config.gamma),
            upper_limit: f64::MAX,
            updated_upper_limit: f64::MAX,
            threshold: f64::MAX,
            iterations: 0,
            started: None,
        }
    }

    /// Observe the cost of a candidate and decide whether it replaces the reference.
    pub fn accept(&mut self, cost: f64) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.accept_at(cost, started.elapsed().as_secs_f64())
    }

    /// Same as [`Self::accept`] with an explicit elapsed time in seconds.
    pub fn accept_at(&mut self, cost: f64, elapsed_secs: f64) -> bool {
        self.average.push(cost);
        self.iterations += 1;
        let window_end = self.iterations % self.gamma == 0;

        if window_end {
            self.upper_limit = self.updated_upper_limit;
            self.updated_upper_limit = f64::MAX;
        }
        self.updated_upper_limit = self.updated_upper_limit.min(cost);
        self.upper_limit = self.upper_limit.min(cost);

        if window_end {
            let steps = match self.criterion {
                StoppingCriterion::Iteration => self.execution_limit,
                StoppingCriterion::Time => {
                    projected_iterations(self.iterations, elapsed_secs, self.execution_limit)
                }
            };
            self.alpha = decay_factor(self.eta_min, self.eta_max, steps);
            log::debug!("acceptance eta {:.4}, alpha {:.6}", self.eta, self.alpha);
        }

        self.eta = (self.eta * self.alpha).max(self.eta_min);
        self.threshold = self.upper_limit + self.eta * (self.average.average() - self.upper_limit);
        cost <= self.threshold
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Threshold computed by the last decision
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_is_accepted() {
        let mut acceptance = AcceptanceCriterion::new(&Config::default(), 1000.0);
        assert!(acceptance.accept(500.0));
        assert_eq!(acceptance.threshold(), 500.0);
    }

    #[test]
    fn test_threshold_between_best_and_average() {
        let config = Config::default().with_gamma(10).with_eta(0.5, 0.5);
        let mut acceptance = AcceptanceCriterion::new(&config, 1000.0);
        acceptance.accept(100.0);
        acceptance.accept(120.0);
        // Best 100, average 110, eta 0.5
        assert!((acceptance.threshold() - 105.0).abs() < 1e-9);
        assert!(acceptance.accept(104.0));
        assert!(!acceptance.accept(150.0));
    }

    #[test]
    fn test_eta_is_monotone_and_bounded() {
        let config = Config::default().with_gamma(5).with_eta(0.01, 1.0);
        let mut acceptance = AcceptanceCriterion::new(&config, 50.0);
        let mut previous = acceptance.eta();
        for i in 0..200 {
            acceptance.accept(1000.0 - i as f64);
            assert!(acceptance.eta() <= previous + 1e-12);
            assert!(acceptance.eta() >= 0.01 - 1e-12);
            previous = acceptance.eta();
        }
        assert!((acceptance.eta() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_time_mode_decays_with_projected_iterations() {
        let config = Config::default()
            .with_gamma(5)
            .with_eta(0.01, 1.0)
            .with_stopping_criterion(StoppingCriterion::Time);
        let mut acceptance = AcceptanceCriterion::new(&config, 10.0);

        // 5 iterations in 1s of a 10s run project 50 iterations
        for _ in 0..4 {
            acceptance.accept_at(100.0, 1.0);
            assert_eq!(acceptance.eta(), 1.0);
        }
        acceptance.accept_at(100.0, 1.0);
        let alpha_1 = 0.01f64.powf(1.0 / 50.0);
        assert!((acceptance.eta() - alpha_1).abs() < 1e-12);

        // 10 iterations in 4s project 25 iterations
        for _ in 0..5 {
            acceptance.accept_at(100.0, 4.0);
        }
        let alpha_2 = 0.01f64.powf(1.0 / 25.0);
        assert!((acceptance.eta() - alpha_1.powi(5) * alpha_2).abs() < 1e-12);

        // A run that falls behind pace keeps decaying but never below eta_min
        let mut previous = acceptance.eta();
        for i in 0..500 {
            acceptance.accept_at(100.0, 4.0 + i as f64 * 0.5);
            assert!(acceptance.eta() <= previous + 1e-12);
            assert!(acceptance.eta() >= 0.01 - 1e-12);
            previous = acceptance.eta();
        }
        assert!(acceptance.eta() < alpha_1.powi(5) * alpha_2);
    }

    #[test]
    fn test_upper_limit_forgets_old_windows() {
        let config = Config::default().with_gamma(2).with_eta(1e-9, 1e-9);
        let mut acceptance = AcceptanceCriterion::new(&config, 1000.0);
        acceptance.accept(10.0);
        acceptance.accept(50.0);
        acceptance.accept(60.0);
        acceptance.accept(70.0);
        // The window closing at iteration 4 restarts from the best of iterations 2..=3
        assert!((acceptance.threshold() - 50.0).abs() < 1e-6);
    }
}
