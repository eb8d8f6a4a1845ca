//! Feasibility repair: remove capacity overload, growing the fleet when the
//! current routes cannot absorb it.

use super::local_search::{LocalSearch, SearchMode};
use crate::config::Config;
use crate::error::Result;
use crate::instance::Instance;
use crate::solution::Solution;

pub struct FeasibilityPhase {
    search: LocalSearch,
}

impl FeasibilityPhase {
    pub fn new(instance: &Instance, config: &Config) -> Self {
        FeasibilityPhase {
            search: LocalSearch::with_mode(instance, config, SearchMode::Repair),
        }
    }

    /// Make every route respect the vehicle capacity.
    ///
    /// Overload-reducing moves are executed until none is left. If overload
    /// remains, an empty route is opened and the overloaded routes are
    /// rescanned. Fails with `FleetExhausted` when no route slot is left.
    pub fn make_feasible(&mut self, instance: &Instance, s: &mut Solution) -> Result<()> {
        loop {
            self.search.search(instance, s);

            if s.is_feasible() {
                for slot in 0..s.num_routes() {
                    if s.route(slot).modified {
                        self.search.improve_route(instance, s, slot);
                    }
                }
                s.remove_empty_routes();
                return Ok(());
            }

            let slot = s.add_route()?;
            log::debug!(
                "repair stalled with overload {}, opening route {}",
                -s.infeasibility(),
                slot
            );
            for r in 0..s.num_routes() {
                if !s.route(r).is_feasible() {
                    s.mark_route_modified(r);
                }
            }
        }
    }
}
