//! Move evaluation and execution.
//!
//! Cost evaluators predict the travel-cost change of a move with a constant
//! number of distance lookups. Capacity evaluators return the gain
//! `-violation_before + violation_after`, where both violations are sums of
//! negative available capacities: a positive gain means overload was removed,
//! a negative gain means the move creates (or worsens) overload.

use super::candidate::{CandidateNode, MoveType};
use crate::instance::Instance;
use crate::solution::Solution;

#[inline]
fn d(instance: &Instance, s: &Solution, i: usize, j: usize) -> f64 {
    instance.dist(s.node(i).name, s.node(j).name)
}

/// Relocate `a` right after `b`
pub fn shift_cost(instance: &Instance, s: &Solution, a: usize, b: usize) -> f64 {
    let (ap, an, bn) = (s.node(a).prev, s.node(a).next, s.node(b).next);
    d(instance, s, ap, an) - d(instance, s, a, ap) - d(instance, s, a, an) + d(instance, s, a, b)
        + d(instance, s, a, bn)
        - d(instance, s, b, bn)
}

/// Exchange the positions of `a` and `b`
pub fn swap_cost(instance: &Instance, s: &Solution, a: usize, b: usize) -> f64 {
    let (ap, an) = (s.node(a).prev, s.node(a).next);
    let (bp, bn) = (s.node(b).prev, s.node(b).next);
    let dist = |i, j| d(instance, s, i, j);

    if an != b && ap != b {
        -(dist(a, ap) + dist(a, an) + dist(b, bp) + dist(b, bn))
            + (dist(a, bp) + dist(a, bn) + dist(b, ap) + dist(b, an))
    } else if an == b {
        -(dist(a, ap) + dist(b, bn)) + (dist(a, bn) + dist(b, ap))
    } else {
        -(dist(b, bp) + dist(a, an)) + (dist(b, an) + dist(a, bp))
    }
}

/// `a` moves after `prev_a` (in `b`'s route), `b` moves after `prev_b` (in `a`'s route)
pub fn swap_star_cost(
    instance: &Instance,
    s: &Solution,
    a: usize,
    b: usize,
    prev_a: usize,
    prev_b: usize,
) -> f64 {
    let dist = |i, j| d(instance, s, i, j);
    let a_before_b = s.node(prev_a).next == b;
    let b_before_a = s.node(prev_b).next == a;

    match (a_before_b, b_before_a) {
        (false, false) => shift_cost(instance, s, a, prev_a) + shift_cost(instance, s, b, prev_b),
        (true, false) => {
            let (ap, an, bn) = (s.node(a).prev, s.node(a).next, s.node(b).next);
            let pbn = s.node(prev_b).next;
            -dist(prev_a, b) - dist(b, bn) + dist(prev_a, a) + dist(bn, a) - dist(prev_b, pbn)
                + dist(prev_b, b)
                + dist(b, pbn)
                - dist(ap, a)
                - dist(a, an)
                + dist(ap, an)
        }
        (false, true) => {
            let (bp, bn, an) = (s.node(b).prev, s.node(b).next, s.node(a).next);
            let pan = s.node(prev_a).next;
            -dist(prev_b, a) - dist(a, an) + dist(prev_b, b) + dist(an, b) - dist(prev_a, pan)
                + dist(prev_a, a)
                + dist(a, pan)
                - dist(bp, b)
                - dist(b, bn)
                + dist(bp, bn)
        }
        (true, true) => swap_cost(instance, s, a, b),
    }
}

/// Exchange the tails following `a` and `b`
pub fn cross_cost(instance: &Instance, s: &Solution, a: usize, b: usize) -> f64 {
    let (an, bn) = (s.node(a).next, s.node(b).next);
    -(d(instance, s, a, an) + d(instance, s, b, bn)) + (d(instance, s, a, bn) + d(instance, s, b, an))
}

/// Link `a` to `b` and `a.next` to `b.next`, reversing the pieces in between
pub fn cross_inverted_cost(instance: &Instance, s: &Solution, a: usize, b: usize) -> f64 {
    let (an, bn) = (s.node(a).next, s.node(b).next);
    -(d(instance, s, a, an) + d(instance, s, b, bn)) + (d(instance, s, a, b) + d(instance, s, bn, an))
}

/// Reverse the path `a.next ..= b` of a single route
pub fn two_opt_cost(instance: &Instance, s: &Solution, a: usize, b: usize) -> f64 {
    let (an, bn) = (s.node(a).next, s.node(b).next);
    -(d(instance, s, a, an) + d(instance, s, b, bn)) + (d(instance, s, a, b) + d(instance, s, an, bn))
}

#[inline]
fn overload(available: i32) -> i32 {
    available.min(0)
}

/// Capacity gain of relocating `a` into `b`'s route
pub fn shift_gain(s: &Solution, a: usize, b: usize) -> i32 {
    let ra = s.route(s.node(a).route).available_capacity();
    let rb = s.route(s.node(b).route).available_capacity();
    let da = s.node(a).demand;
    -(overload(ra) + overload(rb)) + overload(ra + da) + overload(rb - da)
}

/// Capacity gain of exchanging `a` and `b` between their routes
pub fn swap_gain(s: &Solution, a: usize, b: usize) -> i32 {
    let ra = s.route(s.node(a).route).available_capacity();
    let rb = s.route(s.node(b).route).available_capacity();
    let diff = s.node(a).demand - s.node(b).demand;
    -(overload(ra) + overload(rb)) + overload(ra + diff) + overload(rb - diff)
}

/// Capacity gain of exchanging tails; needs fresh demand prefix sums
pub fn cross_gain(s: &Solution, a: usize, b: usize) -> i32 {
    let route_a = s.route(s.node(a).route);
    let route_b = s.route(s.node(b).route);
    let tail_a = route_a.total_demand - s.node(a).accumulated_demand;
    let tail_b = route_b.total_demand - s.node(b).accumulated_demand;
    let (ra, rb) = (route_a.available_capacity(), route_b.available_capacity());
    let diff = tail_a - tail_b;
    -(overload(ra) + overload(rb)) + overload(ra + diff) + overload(rb - diff)
}

/// Capacity gain of the inverted cross; needs fresh demand prefix sums
pub fn cross_inverted_gain(s: &Solution, a: usize, b: usize) -> i32 {
    let route_a = s.route(s.node(a).route);
    let route_b = s.route(s.node(b).route);
    let tail_a = route_a.total_demand - s.node(a).accumulated_demand;
    let head_b = s.node(b).accumulated_demand;
    let (ra, rb) = (route_a.available_capacity(), route_b.available_capacity());
    let diff = tail_a - head_b;
    -(overload(ra) + overload(rb)) + overload(ra + diff) + overload(rb - diff)
}

/// Applies candidates to a solution. Keeps scratch buffers so segment moves
/// do not allocate once warmed up.
#[derive(Debug, Default)]
pub struct MoveExecutor {
    first: Vec<usize>,
    second: Vec<usize>,
}

impl MoveExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute the move and return the realized cost change.
    pub fn apply(&mut self, instance: &Instance, s: &mut Solution, mv: &CandidateNode) -> f64 {
        let before = s.f;
        match mv.move_type {
            MoveType::Shift => {
                s.remove(instance, mv.a);
                s.add_after(instance, mv.a, mv.b);
            }
            MoveType::Swap => self.swap(instance, s, mv.a, mv.b),
            MoveType::SwapStar => {
                s.remove(instance, mv.a);
                s.remove(instance, mv.b);
                s.add_after(instance, mv.a, mv.prev_a);
                s.add_after(instance, mv.b, mv.prev_b);
            }
            MoveType::Cross => self.cross(instance, s, mv.a, mv.b),
            MoveType::CrossInverted => self.cross_inverted(instance, s, mv.a, mv.b),
            MoveType::TwoOpt => {
                s.reverse_segment(instance, mv.a, mv.b);
            }
        }
        s.f - before
    }

    fn swap(&mut self, instance: &Instance, s: &mut Solution, a: usize, b: usize) {
        let (ap, an) = (s.node(a).prev, s.node(a).next);
        let bp = s.node(b).prev;
        if an == b {
            s.remove(instance, a);
            s.add_after(instance, a, b);
        } else if ap == b {
            s.remove(instance, b);
            s.add_after(instance, b, a);
        } else {
            s.remove(instance, a);
            s.remove(instance, b);
            s.add_after(instance, a, bp);
            s.add_after(instance, b, ap);
        }
    }

    fn cross(&mut self, instance: &Instance, s: &mut Solution, a: usize, b: usize) {
        collect_tail(s, a, &mut self.first);
        collect_tail(s, b, &mut self.second);
        for &x in self.first.iter().chain(self.second.iter()) {
            s.remove(instance, x);
        }
        relink_after(instance, s, a, self.second.iter().copied());
        relink_after(instance, s, b, self.first.iter().copied());
    }

    fn cross_inverted(&mut self, instance: &Instance, s: &mut Solution, a: usize, b: usize) {
        let depot_b = s.depot_of(s.node(b).route);
        collect_tail(s, a, &mut self.first);
        collect_head(s, b, &mut self.second);
        for &x in self.first.iter().chain(self.second.iter()) {
            s.remove(instance, x);
        }
        relink_after(instance, s, a, self.second.iter().rev().copied());
        relink_after(instance, s, depot_b, self.first.iter().rev().copied());
    }
}

/// Nodes after `x` up to (excluding) its route's depot
fn collect_tail(s: &Solution, x: usize, buf: &mut Vec<usize>) {
    buf.clear();
    let depot = s.depot_of(s.node(x).route);
    let mut aux = s.node(x).next;
    while aux != depot {
        buf.push(aux);
        aux = s.node(aux).next;
    }
}

/// Nodes from the first customer of `x`'s route up to and including `x`
fn collect_head(s: &Solution, x: usize, buf: &mut Vec<usize>) {
    buf.clear();
    if s.node(x).is_depot() {
        return;
    }
    let depot = s.depot_of(s.node(x).route);
    let mut aux = s.node(depot).next;
    loop {
        buf.push(aux);
        if aux == x {
            break;
        }
        aux = s.node(aux).next;
    }
}

/// Insert a chain of unplaced nodes one after the other, starting after `anchor`
fn relink_after(instance: &Instance, s: &mut Solution, anchor: usize, chain: impl Iterator<Item = usize>) {
    let mut prev = anchor;
    for x in chain {
        s.add_after(instance, x, prev);
        prev = x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_instances;

    const EPS: f64 = 1e-9;

    fn solution(instance: &Instance, routes: &[Vec<usize>]) -> Solution {
        let mut s = Solution::new(instance);
        s.set_routes(instance, routes).unwrap();
        s.set_all_accumulated_demand();
        s
    }

    fn check(instance: &Instance, s: &mut Solution, mv: CandidateNode, predicted: f64) {
        let mut exec = MoveExecutor::new();
        let realized = exec.apply(instance, s, &mv);
        assert!(
            (realized - predicted).abs() < EPS,
            "{:?}: predicted {} realized {}",
            mv.move_type,
            predicted,
            realized
        );
        assert!(s.audit(instance, EPS, false, false).is_ok());
    }

    #[test]
    fn test_shift_between_routes() {
        let instance = test_instances::six_customers();
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let predicted = shift_cost(&instance, &s, 2, 5);
        check(&instance, &mut s, CandidateNode::new(MoveType::Shift, 2, 5, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![1, 3], vec![4, 5, 2, 6]]);
    }

    #[test]
    fn test_shift_after_depot() {
        let instance = test_instances::six_customers();
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let depot = s.depot_of(1);
        let predicted = shift_cost(&instance, &s, 3, depot);
        check(&instance, &mut s, CandidateNode::new(MoveType::Shift, 3, depot, 0.0), predicted);
        assert_eq!(s.to_routes()[1], vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_swap_variants() {
        let instance = test_instances::six_customers();
        // Different routes
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let predicted = swap_cost(&instance, &s, 1, 6);
        check(&instance, &mut s, CandidateNode::new(MoveType::Swap, 1, 6, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![6, 2, 3], vec![4, 5, 1]]);

        // Adjacent, a.next == b
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let predicted = swap_cost(&instance, &s, 1, 2);
        check(&instance, &mut s, CandidateNode::new(MoveType::Swap, 1, 2, 0.0), predicted);
        assert_eq!(s.to_routes()[0], vec![2, 1, 3]);

        // Adjacent, a.prev == b
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let predicted = swap_cost(&instance, &s, 3, 2);
        check(&instance, &mut s, CandidateNode::new(MoveType::Swap, 3, 2, 0.0), predicted);
        assert_eq!(s.to_routes()[0], vec![1, 3, 2]);

        // One node apart
        let mut s = solution(&instance, &[vec![1, 2, 3], vec![4, 5, 6]]);
        let predicted = swap_cost(&instance, &s, 1, 3);
        check(&instance, &mut s, CandidateNode::new(MoveType::Swap, 1, 3, 0.0), predicted);
        assert_eq!(s.to_routes()[0], vec![3, 2, 1]);
    }

    #[test]
    fn test_swap_star_variants() {
        let instance = test_instances::six_customers();
        let base = [vec![1, 2, 3], vec![4, 5, 6]];

        // Generic: anchors away from the swapped nodes
        let mut s = solution(&instance, &base);
        let (pa, pb) = (6, 3);
        let predicted = swap_star_cost(&instance, &s, 1, 4, pa, pb);
        let mv = CandidateNode::new(MoveType::SwapStar, 1, 4, 0.0).with_anchors(pa, pb);
        check(&instance, &mut s, mv, predicted);
        assert_eq!(s.to_routes(), vec![vec![2, 3, 4], vec![5, 6, 1]]);

        // prev_a.next == b
        let mut s = solution(&instance, &base);
        let (pa, pb) = (4, 2);
        let predicted = swap_star_cost(&instance, &s, 1, 5, pa, pb);
        let mv = CandidateNode::new(MoveType::SwapStar, 1, 5, 0.0).with_anchors(pa, pb);
        check(&instance, &mut s, mv, predicted);

        // prev_b.next == a
        let mut s = solution(&instance, &base);
        let (pa, pb) = (6, 1);
        let predicted = swap_star_cost(&instance, &s, 2, 4, pa, pb);
        let mv = CandidateNode::new(MoveType::SwapStar, 2, 4, 0.0).with_anchors(pa, pb);
        check(&instance, &mut s, mv, predicted);

        // Both anchors precede the other node: plain swap
        let mut s = solution(&instance, &base);
        let (pa, pb) = (4, 1);
        let predicted = swap_star_cost(&instance, &s, 2, 5, pa, pb);
        let mv = CandidateNode::new(MoveType::SwapStar, 2, 5, 0.0).with_anchors(pa, pb);
        check(&instance, &mut s, mv, predicted);
        assert_eq!(s.to_routes(), vec![vec![1, 5, 3], vec![4, 2, 6]]);
    }

    #[test]
    fn test_cross_variants() {
        let instance = test_instances::six_customers();
        let base = [vec![1, 2, 3], vec![4, 5, 6]];

        let mut s = solution(&instance, &base);
        let predicted = cross_cost(&instance, &s, 1, 5);
        check(&instance, &mut s, CandidateNode::new(MoveType::Cross, 1, 5, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![1, 6], vec![4, 5, 2, 3]]);

        // From a depot: the whole route is the tail
        let mut s = solution(&instance, &base);
        let depot = s.depot_of(0);
        let predicted = cross_cost(&instance, &s, depot, 4);
        check(&instance, &mut s, CandidateNode::new(MoveType::Cross, depot, 4, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![5, 6], vec![4, 1, 2, 3]]);
    }

    #[test]
    fn test_cross_inverted_variants() {
        let instance = test_instances::six_customers();
        let base = [vec![1, 2, 3], vec![4, 5, 6]];

        let mut s = solution(&instance, &base);
        let predicted = cross_inverted_cost(&instance, &s, 1, 5);
        check(&instance, &mut s, CandidateNode::new(MoveType::CrossInverted, 1, 5, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![1, 5, 4], vec![3, 2, 6]]);

        let mut s = solution(&instance, &base);
        let (da, db) = (s.depot_of(0), s.depot_of(1));
        let predicted = cross_inverted_cost(&instance, &s, da, db);
        check(&instance, &mut s, CandidateNode::new(MoveType::CrossInverted, da, db, 0.0), predicted);
        assert_eq!(s.to_routes(), vec![vec![], vec![3, 2, 1, 4, 5, 6]]);
    }

    #[test]
    fn test_two_opt() {
        let instance = test_instances::scattered(8, 100);
        let mut s = solution(&instance, &[vec![1, 2, 3, 4, 5, 6, 7, 8]]);
        let predicted = two_opt_cost(&instance, &s, 2, 6);
        check(&instance, &mut s, CandidateNode::new(MoveType::TwoOpt, 2, 6, 0.0), predicted);
        assert_eq!(s.to_routes()[0], vec![1, 2, 6, 5, 4, 3, 7, 8]);

        // Segment wrapping over the depot
        let mut s = solution(&instance, &[vec![1, 2, 3, 4, 5, 6, 7, 8]]);
        let predicted = two_opt_cost(&instance, &s, 7, 2);
        check(&instance, &mut s, CandidateNode::new(MoveType::TwoOpt, 7, 2, 0.0), predicted);
    }

    #[test]
    fn test_intra_moves_involving_depot() {
        let instance = test_instances::scattered(6, 100);
        let mut s = solution(&instance, &[vec![1, 2, 3, 4, 5, 6]]);
        let depot = s.depot_of(0);
        let predicted = shift_cost(&instance, &s, depot, 3);
        check(&instance, &mut s, CandidateNode::new(MoveType::Shift, depot, 3, 0.0), predicted);
        assert_eq!(s.to_routes()[0], vec![4, 5, 6, 1, 2, 3]);

        let mut s = solution(&instance, &[vec![1, 2, 3, 4, 5, 6]]);
        let depot = s.depot_of(0);
        let predicted = swap_cost(&instance, &s, 4, depot);
        check(&instance, &mut s, CandidateNode::new(MoveType::Swap, 4, depot, 0.0), predicted);
    }

    #[test]
    fn test_capacity_gains() {
        let instance = test_instances::six_customers();
        // Route 0 holds 3+3+4+2 = 12 > 10, route 1 holds 4
        let s = solution(&instance, &[vec![1, 2, 3, 4], vec![5, 6]]);
        assert_eq!(shift_gain(&s, 4, 5), 2);
        assert_eq!(shift_gain(&s, 1, 5), 2);
        assert_eq!(shift_gain(&s, 5, 1), -2);
        assert_eq!(swap_gain(&s, 3, 5), 2);
        assert_eq!(swap_gain(&s, 4, 5), 0);
        // Tail after customer 2 is {3,4} = 6, tail after customer 5 is {6} = 2
        assert_eq!(cross_gain(&s, 2, 5), 2);
        // Head up to customer 5 is {5} = 2, so route 0 drops to 8
        assert_eq!(cross_inverted_gain(&s, 2, 5), 2);
    }
}
