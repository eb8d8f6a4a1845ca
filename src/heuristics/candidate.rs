//! Candidate move descriptors and the per-route-pair candidate cache.

use ordered_float::OrderedFloat;

/// Neighbourhood a candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    /// Relocate `a` after `b`
    Shift,
    /// Exchange the positions of `a` and `b`
    Swap,
    /// Exchange `a` and `b`, each inserted at its best position in the other route
    SwapStar,
    /// Exchange the tails following `a` and `b`
    Cross,
    /// Join the head of `a` with the reversed head of `b`, and the reversed tail of `a` with the tail of `b`
    CrossInverted,
    /// Reverse the path `a.next ..= b` inside one route
    TwoOpt,
}

/// A pending move with its predicted effect.
#[derive(Debug, Clone, Copy)]
pub struct CandidateNode {
    pub active: bool,
    pub move_type: MoveType,
    /// Arena index of the first endpoint
    pub a: usize,
    /// Arena index of the second endpoint
    pub b: usize,
    /// SWAP*: anchor after which `a` is inserted (in `b`'s route)
    pub prev_a: usize,
    /// SWAP*: anchor after which `b` is inserted (in `a`'s route)
    pub prev_b: usize,
    /// Route slot of `a` when the candidate was recorded
    pub route_a: usize,
    /// Route slot of `b` when the candidate was recorded
    pub route_b: usize,
    /// Predicted cost change
    pub cost: f64,
    /// Ranking key (the cost itself when optimizing, cost per unit of capacity gain when repairing)
    pub evaluation_cost: f64,
    /// Capacity violation removed by the move
    pub gain: i32,
}

impl CandidateNode {
    pub fn new(move_type: MoveType, a: usize, b: usize, cost: f64) -> Self {
        CandidateNode {
            active: true,
            move_type,
            a,
            b,
            prev_a: a,
            prev_b: b,
            route_a: 0,
            route_b: 0,
            cost,
            evaluation_cost: cost,
            gain: 0,
        }
    }

    pub fn with_anchors(mut self, prev_a: usize, prev_b: usize) -> Self {
        self.prev_a = prev_a;
        self.prev_b = prev_b;
        self
    }

    pub fn with_routes(mut self, route_a: usize, route_b: usize) -> Self {
        self.route_a = route_a;
        self.route_b = route_b;
        self
    }

    /// Inactive cell that every real candidate beats
    pub fn empty() -> Self {
        let mut node = CandidateNode::new(MoveType::Shift, 0, 0, f64::MAX);
        node.clean();
        node
    }

    pub fn clean(&mut self) {
        self.active = false;
        self.cost = f64::MAX;
        self.evaluation_cost = f64::MAX;
        self.gain = 0;
    }

    #[inline]
    pub fn touches(&self, route: usize) -> bool {
        self.route_a == route || self.route_b == route
    }
}

/// One candidate cell per unordered pair of route slots, plus the list of
/// cells currently holding a move. Allocated once and reused across calls.
pub struct CandidateMatrix {
    cells: Vec<CandidateNode>,
    size: usize,
    active: Vec<usize>,
}

impl CandidateMatrix {
    pub fn new(max_routes: usize) -> Self {
        let pairs = max_routes * max_routes.saturating_sub(1) / 2;
        CandidateMatrix {
            cells: vec![CandidateNode::empty(); pairs],
            size: max_routes,
            active: Vec::with_capacity(pairs),
        }
    }

    /// Upper-triangle index of the unordered pair `{i, j}`, `i != j`
    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i != j && i < self.size && j < self.size);
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        lo * (2 * self.size - lo - 1) / 2 + (hi - lo - 1)
    }

    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> &CandidateNode {
        &self.cells[self.index(i, j)]
    }

    /// Overwrite the cell of the candidate's route pair
    pub fn store(&mut self, candidate: CandidateNode) {
        let idx = self.index(candidate.route_a, candidate.route_b);
        if !self.cells[idx].active {
            self.active.push(idx);
        }
        self.cells[idx] = candidate;
        self.cells[idx].active = true;
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Best active candidate: lowest evaluation cost, ties to the larger gain
    pub fn best(&mut self) -> Option<CandidateNode> {
        let cells = &self.cells;
        self.active
            .sort_by_key(|&i| (OrderedFloat(cells[i].evaluation_cost), std::cmp::Reverse(cells[i].gain)));
        self.active.first().map(|&i| self.cells[i])
    }

    /// Drop every candidate touching either route
    pub fn invalidate_routes(&mut self, route_a: usize, route_b: usize) {
        let cells = &mut self.cells;
        self.active.retain(|&i| {
            let cell = &mut cells[i];
            if cell.touches(route_a) || cell.touches(route_b) {
                cell.clean();
                false
            } else {
                true
            }
        });
    }

    pub fn clear(&mut self) {
        for &i in &self.active {
            self.cells[i].clean();
        }
        self.active.clear();
    }
}
