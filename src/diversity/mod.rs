//! Diversity control for the AILS search.
//!
//! Three controllers steer how far the search wanders from its reference
//! solution: [`DistAdjustment`] shrinks the ideal distance over the run,
//! [`OmegaAdjustment`] tunes each perturbation's strength toward that ideal
//! distance, and [`AcceptanceCriterion`] tightens the acceptance threshold.

pub mod acceptance;
pub mod dist_adjustment;
pub mod distance;
pub mod mean;
pub mod omega;

pub use acceptance::AcceptanceCriterion;
pub use dist_adjustment::DistAdjustment;
pub use distance::pairwise_distance;
pub use mean::MovingAverage;
pub use omega::OmegaAdjustment;

use std::cell::Cell;
use std::rc::Rc;

/// Shared handle to the current ideal distance between a reference
/// solution and its perturbed, re-optimized successor.
#[derive(Debug, Clone, Default)]
pub struct IdealDist(Rc<Cell<f64>>);

impl IdealDist {
    pub fn new(value: f64) -> Self {
        IdealDist(Rc::new(Cell::new(value)))
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.0.set(value);
    }
}

/// Geometric factor taking `start` to `end` in `steps` multiplications.
/// Degenerate step counts leave the value unchanged.
pub(crate) fn decay_factor(end: f64, start: f64, steps: f64) -> f64 {
    if steps.is_finite() && steps > 0.0 && start > 0.0 && end > 0.0 {
        (end / start).powf(1.0 / steps)
    } else {
        1.0
    }
}

/// Total number of iterations a time-limited run is expected to reach,
/// extrapolated from the pace so far.
pub(crate) fn projected_iterations(iterations: usize, elapsed_secs: f64, limit_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 || limit_secs <= 0.0 {
        return f64::INFINITY;
    }
    iterations as f64 / (elapsed_secs / limit_secs)
}
