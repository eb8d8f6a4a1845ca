//! Ideal distance schedule.

use super::{decay_factor, projected_iterations, IdealDist};
use crate::config::{Config, StoppingCriterion};
use std::time::Instant;

/// Shrinks the ideal distance geometrically from `d_max` toward `d_min`
/// over the run budget.
pub struct DistAdjustment {
    ideal: IdealDist,
    d_min: f64,
    d_max: f64,
    criterion: StoppingCriterion,
    execution_limit: f64,
    iterations: usize,
    alpha: f64,
    started: Option<Instant>,
}

impl DistAdjustment {
    /// Resets the shared ideal distance to `d_max`.
    pub fn new(ideal: IdealDist, config: &Config, execution_limit: f64) -> Self {
        ideal.set(config.d_max);
        DistAdjustment {
            ideal,
            d_min: config.d_min,
            d_max: config.d_max,
            criterion: config.stopping_criterion,
            execution_limit,
            iterations: 0,
            alpha: 1.0,
            started: None,
        }
    }

    /// One step of the schedule, called once per iteration.
    pub fn adjust(&mut self) {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.adjust_at(started.elapsed().as_secs_f64());
    }

    /// Same as [`Self::adjust`] with an explicit elapsed time in seconds.
    pub fn adjust_at(&mut self, elapsed_secs: f64) {
        self.iterations += 1;
        let steps = match self.criterion {
            StoppingCriterion::Iteration => self.execution_limit,
            StoppingCriterion::Time => {
                projected_iterations(self.iterations, elapsed_secs, self.execution_limit)
            }
        };
        self.alpha = decay_factor(self.d_min, self.d_max, steps);

        let value = (self.ideal.get() * self.alpha).clamp(self.d_min, self.d_max);
        self.ideal.set(value);
    }

    pub fn ideal(&self) -> f64 {
        self.ideal.get()
    }
}
