//! Route bookkeeping: running cost and load of one circular route.

/// Aggregates of one route. The node links themselves live in the
/// solution's arena; `depot` is the arena index of the sentinel head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    /// Slot index, kept contiguous for active routes
    pub name: usize,
    /// Arena index of this route's depot node
    pub depot: usize,
    /// Vehicle capacity
    pub capacity: i32,
    /// Sum of customer demands
    pub total_demand: i32,
    /// Travel cost of the closed tour
    pub f_route: f64,
    /// Number of nodes, depot included
    pub num_elements: usize,
    /// Touched since the last perturbation
    pub modified: bool,
}

impl Route {
    pub fn new(name: usize, depot: usize, capacity: i32) -> Self {
        Route {
            name,
            depot,
            capacity,
            total_demand: 0,
            f_route: 0.0,
            num_elements: 1,
            modified: false,
        }
    }

    /// Remaining capacity (negative when overloaded)
    #[inline]
    pub fn available_capacity(&self) -> i32 {
        self.capacity - self.total_demand
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.total_demand <= self.capacity
    }

    /// Only the depot is left
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_elements <= 1
    }

    /// Reset the aggregates of an emptied route
    pub fn reset(&mut self) {
        self.total_demand = 0;
        self.f_route = 0.0;
        self.num_elements = 1;
        self.modified = true;
    }
}
