//! Ruin-and-recreate perturbation operators.
//!
//! A perturbation removes `omega` customers following a removal pattern and
//! reinserts them in random order with one of the insertion heuristics. The
//! strength `omega` comes from the operator's own [`OmegaAdjustment`].

use crate::config::{Config, InsertionHeuristic, PerturbationKind};
use crate::diversity::{IdealDist, OmegaAdjustment};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Removal pattern of a perturbation operator
pub trait RemovalStrategy {
    fn kind(&self) -> PerturbationKind;

    /// Unlink up to `omega` customers from `s`, appending them to `removed`.
    fn remove(
        &self,
        instance: &Instance,
        s: &mut Solution,
        omega: usize,
        rng: &mut ChaCha8Rng,
        removed: &mut Vec<usize>,
    );
}

/// Removes the nearest neighbours of a random customer
#[derive(Debug, Clone, Copy)]
pub struct Concentric {
    /// Neighbours of the reference customer that may be removed
    pub knn_limit: usize,
}

impl RemovalStrategy for Concentric {
    fn kind(&self) -> PerturbationKind {
        PerturbationKind::Concentric
    }

    fn remove(
        &self,
        instance: &Instance,
        s: &mut Solution,
        omega: usize,
        rng: &mut ChaCha8Rng,
        removed: &mut Vec<usize>,
    ) {
        let reference = rng.gen_range(1..=instance.num_customers());
        for &k in instance.knn_within(reference, self.knn_limit) {
            if removed.len() >= omega {
                break;
            }
            if k != 0 && s.node(k).in_solution {
                s.remove(instance, k);
                removed.push(k);
            }
        }
    }
}

/// Removes chains of consecutive customers
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl RemovalStrategy for Sequential {
    fn kind(&self) -> PerturbationKind {
        PerturbationKind::Sequential
    }

    fn remove(
        &self,
        instance: &Instance,
        s: &mut Solution,
        omega: usize,
        rng: &mut ChaCha8Rng,
        removed: &mut Vec<usize>,
    ) {
        let customers = instance.num_customers();
        let omega = omega.min(customers);

        while removed.len() < omega {
            let budget = omega - removed.len();
            let mut start = rng.gen_range(1..=customers);
            while !s.node(start).in_solution {
                start = rng.gen_range(1..=customers);
            }

            let mut chain = 0;
            loop {
                chain += 1;
                let mut node = s.node(start).next;
                if s.node(node).is_depot() {
                    node = s.node(node).next;
                }
                s.remove(instance, node);
                removed.push(node);
                if node == start || chain >= budget {
                    break;
                }
            }
        }
    }
}

/// Registry of removal patterns
pub fn removal_strategy(kind: PerturbationKind, config: &Config) -> Box<dyn RemovalStrategy> {
    match kind {
        PerturbationKind::Sequential => Box::new(Sequential),
        PerturbationKind::Concentric => Box::new(Concentric {
            knn_limit: config.knn_limit,
        }),
    }
}

/// Build one perturbation operator per configured kind, all sharing the
/// same ideal distance.
pub fn build_perturbations(instance: &Instance, config: &Config, ideal: &IdealDist) -> Vec<Perturbation> {
    config
        .perturbations
        .iter()
        .map(|&kind| Perturbation::new(kind, instance, config, ideal.clone()))
        .collect()
}

/// A removal pattern bound to its strength controller and the insertion
/// heuristics it may draw from.
pub struct Perturbation {
    strategy: Box<dyn RemovalStrategy>,
    omega: OmegaAdjustment,
    heuristics: Vec<InsertionHeuristic>,
    varphi: usize,
    knn_limit: usize,
    removed: Vec<usize>,
    last_heuristic: Option<InsertionHeuristic>,
}

impl Perturbation {
    pub fn new(kind: PerturbationKind, instance: &Instance, config: &Config, ideal: IdealDist) -> Self {
        Perturbation {
            strategy: removal_strategy(kind, config),
            omega: OmegaAdjustment::new(kind, config, instance.size(), ideal),
            heuristics: config.insertion_heuristics.clone(),
            varphi: config.varphi,
            knn_limit: config.knn_limit,
            removed: Vec::with_capacity(instance.num_customers()),
            last_heuristic: None,
        }
    }

    pub fn kind(&self) -> PerturbationKind {
        self.strategy.kind()
    }

    pub fn omega(&self) -> &OmegaAdjustment {
        &self.omega
    }

    pub fn omega_mut(&mut self) -> &mut OmegaAdjustment {
        &mut self.omega
    }

    /// Customers removed by the last application
    pub fn count_candidates(&self) -> usize {
        self.removed.len()
    }

    /// Insertion heuristic drawn by the last application
    pub fn last_heuristic(&self) -> Option<InsertionHeuristic> {
        self.last_heuristic
    }

    /// Ruin and recreate `s`. Only nodes touched here stay flagged as
    /// modified, which focuses the following local search.
    pub fn apply(&mut self, instance: &Instance, s: &mut Solution, rng: &mut ChaCha8Rng) {
        s.clear_modified();

        let heuristic = self.heuristics[rng.gen_range(0..self.heuristics.len())];
        self.last_heuristic = Some(heuristic);
        let customers = instance.num_customers();
        let omega = (self.omega.omega().floor() as usize).clamp(1, customers);

        self.removed.clear();
        self.strategy.remove(instance, s, omega, rng, &mut self.removed);

        self.removed.shuffle(rng);

        let limit = match heuristic {
            InsertionHeuristic::Distance => 1,
            InsertionHeuristic::Cost => self.varphi,
        };
        for idx in 0..self.removed.len() {
            let node = self.removed[idx];
            let anchor = insertion_anchor(instance, s, node, limit, self.knn_limit);
            s.add_after(instance, node, anchor);
        }
    }
}

/// Anchor after which `node` is reinserted.
///
/// The first `limit` usable entries among the `knn_limit` nearest neighbours
/// are tried: placed customers, and for the depot entry the depots of all
/// active routes. The node goes right after the cheapest of them, or right
/// before it when that is cheaper.
fn insertion_anchor(instance: &Instance, s: &Solution, node: usize, limit: usize, knn_limit: usize) -> usize {
    let mut best: Option<(usize, f64)> = None;
    let mut usable = 0;

    for &k in instance.knn_within(node, knn_limit) {
        if usable >= limit {
            break;
        }
        if k == 0 {
            if s.num_routes() > 0 {
                usable += 1;
                for slot in 0..s.num_routes() {
                    keep_cheapest(&mut best, instance, s, node, s.depot_of(slot));
                }
            }
        } else if s.node(k).in_solution {
            usable += 1;
            keep_cheapest(&mut best, instance, s, node, k);
        }
    }

    if best.is_none() {
        for c in (1..=s.num_customers()).filter(|&c| s.node(c).in_solution) {
            keep_cheapest(&mut best, instance, s, node, c);
        }
    }
    if best.is_none() {
        for slot in 0..s.num_routes() {
            keep_cheapest(&mut best, instance, s, node, s.depot_of(slot));
        }
    }

    let anchor = match best {
        Some((anchor, _)) => anchor,
        None => return s.depot_of(0),
    };
    let prev = s.node(anchor).prev;
    if s.insertion_cost(instance, node, anchor) < s.insertion_cost(instance, node, prev) {
        anchor
    } else {
        prev
    }
}

#[inline]
fn keep_cheapest(best: &mut Option<(usize, f64)>, instance: &Instance, s: &Solution, node: usize, anchor: usize) {
    let cost = s.insertion_cost(instance, node, anchor);
    if best.map_or(true, |(_, lowest)| cost < lowest) {
        *best = Some((anchor, cost));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsertionHeuristic;
    use crate::instance::test_instances;

    fn perturbation(kind: PerturbationKind, instance: &Instance, heuristic: InsertionHeuristic) -> Perturbation {
        let config = Config::default().with_insertion_heuristics(vec![heuristic]);
        Perturbation::new(kind, instance, &config, IdealDist::new(30.0))
    }

    fn start(instance: &Instance) -> Solution {
        let mut s = Solution::new(instance);
        let routes: Vec<Vec<usize>> = (1..=instance.num_customers())
            .collect::<Vec<_>>()
            .chunks(5)
            .map(|c| c.to_vec())
            .collect();
        s.set_routes(instance, &routes).unwrap();
        s
    }

    #[test]
    fn test_sequential_removes_exactly_omega() {
        let instance = test_instances::scattered(20, 100);
        let mut s = start(&instance);
        let mut op = perturbation(PerturbationKind::Sequential, &instance, InsertionHeuristic::Cost);
        op.omega_mut().set_omega(3.0);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        op.apply(&instance, &mut s, &mut rng);

        assert_eq!(op.count_candidates(), 3);
        assert!(s.audit(&instance, 1e-6, false, false).is_ok());
    }

    #[test]
    fn test_concentric_removes_neighbourhood() {
        let instance = test_instances::scattered(20, 100);
        let mut s = start(&instance);
        let mut op = perturbation(PerturbationKind::Concentric, &instance, InsertionHeuristic::Distance);
        op.omega_mut().set_omega(5.0);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        op.apply(&instance, &mut s, &mut rng);

        assert_eq!(op.count_candidates(), 5);
        assert_eq!(op.last_heuristic(), Some(InsertionHeuristic::Distance));
        assert!(s.audit(&instance, 1e-6, false, false).is_ok());
    }

    #[test]
    fn test_omega_is_clamped_to_customer_count() {
        let instance = test_instances::six_customers();
        for kind in [PerturbationKind::Sequential, PerturbationKind::Concentric] {
            let mut s = start(&instance);
            let mut op = perturbation(kind, &instance, InsertionHeuristic::Cost);
            op.omega_mut().set_omega(1000.0);
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            op.apply(&instance, &mut s, &mut rng);
            assert!(op.count_candidates() <= 6);
            assert!(s.audit(&instance, 1e-6, false, false).is_ok());
        }
    }

    #[test]
    fn test_concentric_stays_within_knn_limit() {
        let instance = test_instances::scattered(20, 100);
        let mut s = start(&instance);
        let config = Config::default().with_knn_limit(2);
        let mut op = Perturbation::new(PerturbationKind::Concentric, &instance, &config, IdealDist::new(30.0));
        op.omega_mut().set_omega(8.0);

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            op.apply(&instance, &mut s, &mut rng);
            assert!(op.count_candidates() <= 2);
            assert!(s.audit(&instance, 1e-6, false, false).is_ok());
        }
    }

    #[test]
    fn test_removed_customers_are_all_reinserted() {
        let instance = test_instances::scattered(20, 100);
        let mut s = start(&instance);
        let mut op = perturbation(PerturbationKind::Sequential, &instance, InsertionHeuristic::Distance);
        op.omega_mut().set_omega(6.0);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        op.apply(&instance, &mut s, &mut rng);

        let mut removed = op.removed.clone();
        removed.sort_unstable();
        removed.dedup();
        assert_eq!(removed.len(), 6);
        assert!(removed.iter().all(|&c| s.node(c).in_solution));
        assert_eq!(s.to_routes().iter().map(Vec::len).sum::<usize>(), 20);
    }

    #[test]
    fn test_only_touched_nodes_are_modified() {
        let instance = test_instances::scattered(30, 100);
        let mut s = start(&instance);
        let mut op = perturbation(PerturbationKind::Concentric, &instance, InsertionHeuristic::Cost);
        op.omega_mut().set_omega(2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        op.apply(&instance, &mut s, &mut rng);

        let modified = (1..=30).filter(|&c| s.node(c).modified).count();
        assert!(modified >= 2);
        assert!(modified < 30);
    }

    #[test]
    fn test_registry_covers_every_kind() {
        let config = Config::default();
        assert_eq!(removal_strategy(PerturbationKind::Sequential, &config).kind(), PerturbationKind::Sequential);
        assert_eq!(removal_strategy(PerturbationKind::Concentric, &config).kind(), PerturbationKind::Concentric);

        let instance = test_instances::six_customers();
        let ops = build_perturbations(&instance, &Config::default(), &IdealDist::new(30.0));
        let kinds: Vec<_> = ops.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![PerturbationKind::Sequential, PerturbationKind::Concentric]);
    }

    #[test]
    fn test_insertion_falls_back_to_full_scan() {
        // Customer 9 is the only neighbour kept for customer 1
        let instance = test_instances::scattered(10, 100).with_knn_limit(1);
        assert_eq!(instance.knn(1), &[9]);
        let mut s = start(&instance);
        s.remove(&instance, 9);
        s.remove(&instance, 1);

        let anchor = insertion_anchor(&instance, &s, 1, 1, 100);
        assert!(s.node(anchor).in_solution);
        s.add_after(&instance, 1, anchor);
        let anchor = insertion_anchor(&instance, &s, 9, 1, 100);
        assert!(anchor == 1 || s.node(anchor).next == 1);
        s.add_after(&instance, 9, anchor);
        assert!(s.audit(&instance, 1e-6, false, false).is_ok());
    }
}
