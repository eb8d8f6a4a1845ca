//! Structural distance between two solutions of the same instance.

use crate::solution::Solution;

/// Number of customers with at least one incident edge in `a` that is not
/// incident to the same customer in `b`. Depot occurrences compare equal.
pub fn pairwise_distance(a: &Solution, b: &Solution) -> usize {
    (1..=a.num_customers())
        .filter(|&c| {
            let (p1, n1) = neighbours(a, c);
            let (p2, n2) = neighbours(b, c);
            let kept = |x: usize| x == p2 || x == n2;
            !(kept(p1) && kept(n1))
        })
        .count()
}

#[inline]
fn neighbours(s: &Solution, c: usize) -> (usize, usize) {
    let node = s.node(c);
    (s.node(node.prev).name, s.node(node.next).name)
}
