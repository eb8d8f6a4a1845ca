//! Inter-route local search for the CVRP.
//!
//! The engine scans the nearest neighbours of modified nodes and keeps, for
//! every pair of routes, only the best move found so far. Moves are then
//! executed best-first: after each one both touched routes are improved
//! internally, every cached move involving them is dropped and the two
//! routes are scanned again.
//!
//! Neighbourhoods:
//! - SHIFT: relocate a customer into another route
//! - SWAP*: exchange two customers, each reinserted at its best position
//! - CROSS: exchange route tails (straight and inverted)
//!
//! The same engine runs in two modes. `Optimize` keeps capacity-neutral or
//! capacity-improving moves that lower the cost by more than epsilon.
//! `Repair` keeps moves that remove overload, ranked by cost per unit of
//! removed overload.

use super::candidate::{CandidateMatrix, CandidateNode, MoveType};
use super::intra_route::IntraLocalSearch;
use super::moves::{self, MoveExecutor};
use crate::config::Config;
use crate::instance::Instance;
use crate::solution::Solution;

/// What the engine is trying to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Lower the cost without creating overload
    Optimize,
    /// Remove overload as cheaply as possible
    Repair,
}

pub struct LocalSearch {
    mode: SearchMode,
    matrix: CandidateMatrix,
    executor: MoveExecutor,
    intra: IntraLocalSearch,
    /// Nearest neighbours scanned per node
    limit: usize,
    epsilon: f64,
}

impl LocalSearch {
    pub fn new(instance: &Instance, config: &Config) -> Self {
        Self::with_mode(instance, config, SearchMode::Optimize)
    }

    pub fn with_mode(instance: &Instance, config: &Config, mode: SearchMode) -> Self {
        LocalSearch {
            mode,
            matrix: CandidateMatrix::new(instance.max_routes()),
            executor: MoveExecutor::new(),
            intra: IntraLocalSearch::new(config),
            limit: config.varphi.min(config.knn_limit).min(instance.num_customers()),
            epsilon: config.epsilon,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Run the inter-route search on every modified route, then optionally
    /// drop the routes it emptied.
    pub fn local_search(&mut self, instance: &Instance, s: &mut Solution, remove_empty: bool) {
        self.search(instance, s);
        if remove_empty {
            s.remove_empty_routes();
        }
    }

    /// Scan modified routes and execute cached moves until none is left.
    pub(crate) fn search(&mut self, instance: &Instance, s: &mut Solution) {
        s.set_all_accumulated_demand();
        self.matrix.clear();

        for slot in 0..s.num_routes() {
            if s.route(slot).modified {
                self.browse_route(instance, s, slot);
            }
        }

        while let Some(best) = self.matrix.best() {
            let (route_a, route_b) = (best.route_a, best.route_b);
            self.executor.apply(instance, s, &best);

            self.intra.improve(instance, s, route_a);
            self.intra.improve(instance, s, route_b);
            s.set_accumulated_demand(route_a);
            s.set_accumulated_demand(route_b);

            self.matrix.invalidate_routes(route_a, route_b);
            self.browse_route(instance, s, route_a);
            self.browse_route(instance, s, route_b);
        }
    }

    /// Intra-route descent on one route; returns the cost change.
    pub(crate) fn improve_route(&mut self, instance: &Instance, s: &mut Solution, slot: usize) -> f64 {
        self.intra.improve(instance, s, slot)
    }

    fn browse_route(&mut self, instance: &Instance, s: &Solution, slot: usize) {
        if s.route(slot).num_elements <= 1 {
            return;
        }
        self.search_shift(instance, s, slot);
        self.search_swap_star(instance, s, slot);
        self.search_cross(instance, s, slot);
    }

    // ------------------------------------------------------------------
    // Neighbourhood scans
    // ------------------------------------------------------------------

    fn search_shift(&mut self, instance: &Instance, s: &Solution, slot: usize) {
        let route_feasible = s.route(slot).is_feasible();

        for a in s.route_nodes(slot) {
            if !s.node(a).modified {
                continue;
            }
            let knn = instance.knn(s.node(a).name);

            match self.mode {
                SearchMode::Optimize => {
                    for &k in knn.iter().take(self.limit) {
                        if k == 0 {
                            for other in (0..s.num_routes()).filter(|&r| r != slot) {
                                let depot = s.depot_of(other);
                                self.offer_shift(instance, s, a, depot);
                            }
                        } else if s.node(k).route != slot {
                            self.offer_shift(instance, s, a, k);
                            self.offer_shift(instance, s, k, a);
                        }
                    }
                }
                SearchMode::Repair => {
                    if !route_feasible {
                        for other in (0..s.num_routes()).filter(|&r| s.route(r).is_feasible()) {
                            let depot = s.depot_of(other);
                            self.offer_shift(instance, s, a, depot);
                        }
                    }
                    for &k in knn.iter().take(self.limit).filter(|&&k| k != 0) {
                        let k_feasible = s.route(s.node(k).route).is_feasible();
                        if !route_feasible && k_feasible {
                            self.offer_shift(instance, s, a, k);
                        }
                        if route_feasible && !k_feasible {
                            self.offer_shift(instance, s, k, a);
                        }
                    }
                }
            }
        }
    }

    fn search_swap_star(&mut self, instance: &Instance, s: &Solution, slot: usize) {
        let route_feasible = s.route(slot).is_feasible();

        for a in s.route_nodes(slot) {
            if !s.node(a).modified {
                continue;
            }
            for &k in instance.knn(s.node(a).name).iter().take(self.limit) {
                if k == 0 {
                    continue;
                }
                let route_k = s.node(k).route;
                let eligible = match self.mode {
                    SearchMode::Optimize => route_k != slot,
                    SearchMode::Repair => route_feasible != s.route(route_k).is_feasible(),
                };
                if !eligible {
                    continue;
                }

                let gain = moves::swap_gain(s, a, k);
                if !self.gain_allowed(gain) {
                    continue;
                }
                let prev_a = s.find_best_position_except_after_knn(instance, route_k, a, k, self.limit);
                let prev_b = s.find_best_position_except_after_knn(instance, slot, k, a, self.limit);
                let cost = moves::swap_star_cost(instance, s, a, k, prev_a, prev_b);
                let candidate = CandidateNode::new(MoveType::SwapStar, a, k, cost).with_anchors(prev_a, prev_b);
                self.offer(s, candidate, gain);
            }
        }
    }

    fn search_cross(&mut self, instance: &Instance, s: &Solution, slot: usize) {
        let depot = s.depot_of(slot);
        let route_feasible = s.route(slot).is_feasible();
        let mode = self.mode;
        let other_route_eligible = |r: usize| match mode {
            SearchMode::Optimize => r != slot,
            SearchMode::Repair => route_feasible != s.route(r).is_feasible(),
        };

        let mut a = depot;
        loop {
            if s.node(a).modified {
                for &k in instance.knn(s.node(a).name).iter().take(self.limit) {
                    if k == 0 {
                        // Repair mode reaches depots through the route sweep below
                        if mode == SearchMode::Optimize {
                            for other in (0..s.num_routes()).filter(|&r| r != slot) {
                                self.offer_cross(instance, s, a, s.depot_of(other));
                            }
                        }
                    } else if other_route_eligible(s.node(k).route) {
                        self.offer_cross(instance, s, a, k);
                    }
                }
                if mode == SearchMode::Repair {
                    for other in (0..s.num_routes()).filter(|&r| other_route_eligible(r)) {
                        self.offer_cross(instance, s, a, s.depot_of(other));
                    }
                }
            }
            a = s.node(a).next;
            if a == depot {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Candidate bookkeeping
    // ------------------------------------------------------------------

    fn offer_shift(&mut self, instance: &Instance, s: &Solution, a: usize, b: usize) {
        let gain = moves::shift_gain(s, a, b);
        if self.gain_allowed(gain) {
            let cost = moves::shift_cost(instance, s, a, b);
            self.offer(s, CandidateNode::new(MoveType::Shift, a, b, cost), gain);
        }
    }

    fn offer_cross(&mut self, instance: &Instance, s: &Solution, a: usize, b: usize) {
        let gain = moves::cross_gain(s, a, b);
        if self.gain_allowed(gain) {
            let cost = moves::cross_cost(instance, s, a, b);
            self.offer(s, CandidateNode::new(MoveType::Cross, a, b, cost), gain);
        }
        let gain = moves::cross_inverted_gain(s, a, b);
        if self.gain_allowed(gain) {
            let cost = moves::cross_inverted_cost(instance, s, a, b);
            self.offer(s, CandidateNode::new(MoveType::CrossInverted, a, b, cost), gain);
        }
    }

    #[inline]
    fn gain_allowed(&self, gain: i32) -> bool {
        match self.mode {
            SearchMode::Optimize => gain >= 0,
            SearchMode::Repair => gain > 0,
        }
    }

    /// Store the candidate if it beats the cached move of its route pair
    fn offer(&mut self, s: &Solution, mut candidate: CandidateNode, gain: i32) {
        let route_a = s.node(candidate.a).route;
        let route_b = s.node(candidate.b).route;
        candidate = candidate.with_routes(route_a, route_b);
        candidate.gain = gain;
        let cell = self.matrix.cell(route_a, route_b);

        let accept = match self.mode {
            SearchMode::Optimize => {
                candidate.cost - cell.cost < -self.epsilon && candidate.cost < -self.epsilon
            }
            SearchMode::Repair => {
                candidate.evaluation_cost = if candidate.cost >= 0.0 {
                    (candidate.cost + 1.0) / gain as f64
                } else {
                    candidate.cost / gain as f64
                };
                candidate.evaluation_cost < cell.evaluation_cost
            }
        };

        if accept {
            self.matrix.store(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_instances;

    fn config() -> Config {
        Config::default().with_varphi(10)
    }

    #[test]
    fn test_optimize_separates_mixed_routes() {
        let instance = test_instances::six_customers();
        let mut s = Solution::new(&instance);
        // Each route mixes the east and west clusters
        s.set_routes(&instance, &[vec![1, 4, 2], vec![5, 3, 6]]).unwrap();
        let before = s.f;

        let mut ls = LocalSearch::new(&instance, &config());
        ls.local_search(&instance, &mut s, true);

        assert!(s.f < before - 1.0);
        assert!(s.audit(&instance, 1e-6, true, true).is_ok());
        for route in s.to_routes() {
            let east = route.iter().filter(|&&c| c <= 3).count();
            assert!(east == 0 || east == route.len(), "mixed route {:?}", route);
        }
    }

    #[test]
    fn test_optimize_never_creates_overload() {
        let instance = test_instances::scattered(30, 20);
        let mut s = Solution::new(&instance);
        let routes: Vec<Vec<usize>> = (1..=30).collect::<Vec<_>>().chunks(5).map(|c| c.to_vec()).collect();
        s.set_routes(&instance, &routes).unwrap();
        assert!(s.is_feasible());
        let before = s.f;

        let mut ls = LocalSearch::new(&instance, &config());
        ls.local_search(&instance, &mut s, true);

        assert!(s.f <= before + 1e-9);
        assert!(s.audit(&instance, 1e-6, true, true).is_ok());
    }

    #[test]
    fn test_optimize_keeps_empty_routes_on_request() {
        let instance = test_instances::six_customers();
        let mut s = Solution::new(&instance);
        s.set_routes(&instance, &[vec![1, 2], vec![3], vec![4, 5, 6]]).unwrap();

        let mut ls = LocalSearch::new(&instance, &config());
        ls.local_search(&instance, &mut s, false);
        assert_eq!(s.num_routes(), 3);
        assert!(s.audit(&instance, 1e-6, true, false).is_ok());
    }

    #[test]
    fn test_repair_search_reduces_overload() {
        let instance = test_instances::six_customers();
        let mut s = Solution::new(&instance);
        // 3+3+4+2 = 12 > 10 in the first route
        s.set_routes(&instance, &[vec![1, 2, 3, 4], vec![5, 6]]).unwrap();
        assert!(!s.is_feasible());

        let mut ls = LocalSearch::with_mode(&instance, &config(), SearchMode::Repair);
        ls.search(&instance, &mut s);
        assert!(s.is_feasible());
        assert!(s.audit(&instance, 1e-6, true, false).is_ok());
        // Customer 4 belongs with the west cluster
        assert_eq!(s.node(4).route, s.node(5).route);
    }
}
