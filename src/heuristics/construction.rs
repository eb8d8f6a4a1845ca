//! Initial solution construction.

use crate::instance::Instance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub trait ConstructionHeuristic {
    /// Rebuild `solution` from scratch so that every customer is routed.
    /// Capacity may be violated; repair runs afterwards.
    fn construct(&self, instance: &Instance, solution: &mut Solution, rng: &mut ChaCha8Rng);
    fn name(&self) -> &str;
}

/// Randomized cheapest insertion
///
/// Opens `min_routes` routes, seeds each with a random customer, then
/// inserts the remaining customers in random order at their cheapest
/// position over all routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomizedInsertion;

impl RandomizedInsertion {
    pub fn new() -> Self {
        RandomizedInsertion
    }

    fn cheapest_anchor(instance: &Instance, solution: &Solution, node: usize) -> usize {
        let mut best = solution.depot_of(0);
        let mut lowest = f64::MAX;
        for slot in 0..solution.num_routes() {
            let (anchor, cost) = solution.find_best_position(instance, slot, node);
            if cost < lowest {
                lowest = cost;
                best = anchor;
            }
        }
        best
    }
}

impl ConstructionHeuristic for RandomizedInsertion {
    fn construct(&self, instance: &Instance, solution: &mut Solution, rng: &mut ChaCha8Rng) {
        solution.clean_all(instance.min_routes());

        let mut pending: Vec<usize> = (1..=instance.num_customers()).collect();

        for slot in 0..solution.num_routes() {
            if pending.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..pending.len());
            let node = pending.swap_remove(idx);
            solution.add_end(instance, slot, node);
        }

        while !pending.is_empty() {
            let idx = rng.gen_range(0..pending.len());
            let node = pending.swap_remove(idx);
            let anchor = Self::cheapest_anchor(instance, solution, node);
            solution.add_after(instance, node, anchor);
        }

        solution.remove_empty_routes();
    }

    fn name(&self) -> &str {
        "RandomizedInsertion"
    }
}
