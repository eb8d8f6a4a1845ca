//! Arena node: one occurrence of a customer or of a route's depot.

/// Route slot of a node that is not placed in any route
pub const NO_ROUTE: usize = usize::MAX;

/// A customer (or depot occurrence) living in a solution's node arena.
///
/// `prev` and `next` are arena indices. Customer `c` lives at index `c`;
/// depot occurrences (name 0) live after the customers, one per route slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Instance identifier (0 = depot)
    pub name: usize,
    /// Demand copied from the instance
    pub demand: i32,
    /// Predecessor in the circular route list
    pub prev: usize,
    /// Successor in the circular route list
    pub next: usize,
    /// Slot of the owning route, `NO_ROUTE` when unplaced
    pub route: usize,
    /// Customer currently placed in a route
    pub in_solution: bool,
    /// Touched since the last perturbation; drives the local search scans
    pub modified: bool,
    /// Demand prefix sum from the depot up to this node
    pub accumulated_demand: i32,
}

impl Node {
    pub fn new(name: usize, demand: i32, index: usize) -> Self {
        Node {
            name,
            demand,
            prev: index,
            next: index,
            route: NO_ROUTE,
            in_solution: false,
            modified: false,
            accumulated_demand: 0,
        }
    }

    #[inline]
    pub fn is_depot(&self) -> bool {
        self.name == 0
    }
}
