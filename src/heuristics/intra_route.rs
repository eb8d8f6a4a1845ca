//! Best-improvement descent inside a single route.
//!
//! Only nodes flagged as modified start a neighbourhood scan, and only their
//! first `varphi` nearest neighbours that sit in the same route are tried.

use super::candidate::{CandidateNode, MoveType};
use super::moves::{self, MoveExecutor};
use crate::config::Config;
use crate::instance::Instance;
use crate::solution::Solution;

pub struct IntraLocalSearch {
    limit: usize,
    epsilon: f64,
    executor: MoveExecutor,
}

impl IntraLocalSearch {
    pub fn new(config: &Config) -> Self {
        IntraLocalSearch {
            limit: config.varphi.min(config.knn_limit),
            epsilon: config.epsilon,
            executor: MoveExecutor::new(),
        }
    }

    /// Improve route `slot` until no 2-opt, SHIFT or SWAP move helps.
    /// Returns the change of the route cost (never positive).
    pub fn improve(&mut self, instance: &Instance, s: &mut Solution, slot: usize) -> f64 {
        let start = s.route(slot).f_route;

        while let Some(mv) = self.best_move(instance, s, slot) {
            self.executor.apply(instance, s, &mv);
        }

        s.route(slot).f_route - start
    }

    fn best_move(&self, instance: &Instance, s: &Solution, slot: usize) -> Option<CandidateNode> {
        let depot = s.depot_of(slot);
        let num_elements = s.route(slot).num_elements;
        let mut lowest = -self.epsilon;
        let mut best = None;

        let mut consider = |move_type: MoveType, a: usize, b: usize, cost: f64| {
            if cost < lowest {
                lowest = cost;
                best = Some(CandidateNode::new(move_type, a, b, cost).with_routes(slot, slot));
            }
        };

        let mut out = depot;
        loop {
            let out_node = *s.node(out);
            if out_node.modified {
                for &k in instance.knn(out_node.name).iter().take(self.limit) {
                    let inn = if k == 0 { depot } else { k };
                    if s.node(inn).route != slot {
                        continue;
                    }

                    if out != inn && inn != out_node.next {
                        consider(MoveType::TwoOpt, out, inn, moves::two_opt_cost(instance, s, out, inn));
                    }

                    if num_elements > 2 && out != inn && out != s.node(inn).next {
                        consider(MoveType::Shift, out, inn, moves::shift_cost(instance, s, out, inn));
                        if inn != out_node.next {
                            consider(MoveType::Shift, inn, out, moves::shift_cost(instance, s, inn, out));
                        }
                    }

                    if num_elements > 2 && inn != out && s.node(inn).next != out {
                        consider(MoveType::Swap, out, inn, moves::swap_cost(instance, s, out, inn));
                    }
                }
            }
            out = out_node.next;
            if out == depot {
                break;
            }
        }

        best
    }
}
