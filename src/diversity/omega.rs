//! Perturbation strength controller.

use super::{IdealDist, MovingAverage};
use crate::config::{Config, PerturbationKind};

/// Tunes the number of customers a perturbation removes so that the
/// distance between reference and re-optimized solutions tracks the
/// ideal distance.
#[derive(Debug, Clone)]
pub struct OmegaAdjustment {
    kind: PerturbationKind,
    omega: f64,
    omega_min: f64,
    omega_max: f64,
    observed: MovingAverage,
    average_omega: MovingAverage,
    ideal: IdealDist,
    gamma: usize,
    observations: usize,
}

impl OmegaAdjustment {
    /// `size` counts the depot.
    pub fn new(kind: PerturbationKind, config: &Config, size: usize, ideal: IdealDist) -> Self {
        let omega_max = (size.saturating_sub(2)).max(1) as f64;
        OmegaAdjustment {
            kind,
            omega: ideal.get(),
            omega_min: 1.0,
            omega_max,
            observed: MovingAverage::new(config.gamma),
            average_omega: MovingAverage::new(config.gamma),
            ideal,
            gamma: config.gamma.max(1),
            observations: 0,
        }
    }

    /// Record the distance produced by the last perturbation; every `gamma`
    /// observations omega is rescaled by `ideal / observed average`.
    pub fn record_distance(&mut self, distance: f64) {
        self.observations += 1;
        self.observed.push(distance);
        if self.observations % self.gamma == 0 {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        let observed = self.observed.average();
        self.omega = if observed > 0.0 {
            self.omega * self.ideal.get() / observed
        } else {
            self.omega_max
        };
        self.omega = self.omega.clamp(self.omega_min, self.omega_max);
        self.average_omega.push(self.omega);
        log::debug!(
            "{} omega {:.2} (observed distance {:.2}, ideal {:.2})",
            self.kind,
            self.omega,
            observed,
            self.ideal.get()
        );
    }

    /// Current omega within `[1, size - 2]`
    pub fn omega(&self) -> f64 {
        self.omega.clamp(self.omega_min, self.omega_max)
    }

    pub fn set_omega(&mut self, omega: f64) {
        self.omega = omega;
    }

    pub fn kind(&self) -> PerturbationKind {
        self.kind
    }

    /// Moving average of the omega values set so far
    pub fn average_omega(&self) -> f64 {
        self.average_omega.average()
    }
}
