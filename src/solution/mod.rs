//! Solution representation and manipulation for the CVRP.
//!
//! A solution owns a fixed-size node arena and one route record per fleet
//! slot. Routes are circular doubly-linked lists threaded through the arena,
//! each headed by its own depot node. Every insertion and removal keeps the
//! route cost, route load and the solution cost up to date, so moves never
//! need a full re-evaluation.

pub mod node;
pub mod route;

pub use node::{Node, NO_ROUTE};
pub use route::Route;

use crate::error::{Result, SolverError};
use crate::instance::Instance;
use std::fmt;

/// A complete assignment of customers to routes.
///
/// Arena layout: index 0 is reserved so that customer `c` sits at index `c`;
/// depot nodes follow the customers. The first `num_routes` route slots are
/// active, the remaining ones are kept empty for fleet growth.
#[derive(Debug, Clone)]
pub struct Solution {
    nodes: Vec<Node>,
    routes: Vec<Route>,
    num_routes: usize,
    num_customers: usize,
    /// Total travel cost of the active routes
    pub f: f64,
}

impl Solution {
    /// Empty solution sized for the instance, `min_routes` active routes
    pub fn new(instance: &Instance) -> Self {
        let num_customers = instance.num_customers();
        let max_routes = instance.max_routes();

        let mut nodes = Vec::with_capacity(num_customers + 1 + max_routes);
        nodes.push(Node::new(0, 0, 0));
        for c in 1..=num_customers {
            nodes.push(Node::new(c, instance.demand(c), c));
        }

        let mut routes = Vec::with_capacity(max_routes);
        for slot in 0..max_routes {
            let depot = num_customers + 1 + slot;
            let mut depot_node = Node::new(0, 0, depot);
            depot_node.route = slot;
            depot_node.in_solution = true;
            nodes.push(depot_node);
            routes.push(Route::new(slot, depot, instance.capacity));
        }

        Solution {
            nodes,
            routes,
            num_routes: instance.min_routes().min(max_routes),
            num_customers,
            f: 0.0,
        }
    }

    /// Overwrite this solution with `source`; both must come from the same instance.
    pub fn copy_from(&mut self, source: &Solution) {
        debug_assert_eq!(self.nodes.len(), source.nodes.len());
        self.nodes.copy_from_slice(&source.nodes);
        self.routes.copy_from_slice(&source.routes);
        self.num_routes = source.num_routes;
        self.f = source.f;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn route(&self, slot: usize) -> &Route {
        &self.routes[slot]
    }

    /// Active routes
    pub fn routes(&self) -> &[Route] {
        &self.routes[..self.num_routes]
    }

    #[inline]
    pub fn num_routes(&self) -> usize {
        self.num_routes
    }

    pub fn num_customers(&self) -> usize {
        self.num_customers
    }

    pub fn max_routes(&self) -> usize {
        self.routes.len()
    }

    /// Arena index of the depot heading route `slot`
    #[inline]
    pub fn depot_of(&self, slot: usize) -> usize {
        self.routes[slot].depot
    }

    /// Arena indices of the customers of route `slot`, in route order
    pub fn route_nodes(&self, slot: usize) -> RouteIter<'_> {
        let depot = self.routes[slot].depot;
        RouteIter { nodes: &self.nodes, depot, current: depot }
    }

    pub fn is_feasible(&self) -> bool {
        self.routes().iter().all(|r| r.is_feasible())
    }

    /// Total overload over all routes, as a non-positive number
    pub fn infeasibility(&self) -> i32 {
        self.routes().iter().map(|r| r.available_capacity().min(0)).sum()
    }

    /// Customers in route order for every active route
    pub fn to_routes(&self) -> Vec<Vec<usize>> {
        (0..self.num_routes)
            .map(|r| self.route_nodes(r).map(|i| self.nodes[i].name).collect())
            .collect()
    }

    // ------------------------------------------------------------------
    // Elementary edits
    // ------------------------------------------------------------------

    /// Cost of inserting `node` between `after` and its successor
    #[inline]
    pub fn insertion_cost(&self, instance: &Instance, node: usize, after: usize) -> f64 {
        let a = &self.nodes[after];
        let name = self.nodes[node].name;
        let next = self.nodes[a.next].name;
        instance.dist(a.name, name) + instance.dist(name, next) - instance.dist(a.name, next)
    }

    /// Unlink `node` from its route; returns the cost change.
    pub fn remove(&mut self, instance: &Instance, node: usize) -> f64 {
        let Node { name, demand, prev, next, route, .. } = self.nodes[node];
        let prev_name = self.nodes[prev].name;
        let next_name = self.nodes[next].name;
        let delta = instance.dist(prev_name, next_name)
            - instance.dist(prev_name, name)
            - instance.dist(name, next_name);

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[prev].modified = true;
        self.nodes[next].modified = true;

        let n = &mut self.nodes[node];
        n.prev = node;
        n.next = node;
        n.route = NO_ROUTE;
        n.in_solution = false;
        n.modified = true;

        let r = &mut self.routes[route];
        r.total_demand -= demand;
        r.num_elements -= 1;
        r.f_route += delta;
        r.modified = true;

        self.f += delta;
        delta
    }

    /// Link `node` right after `after` in `after`'s route; returns the cost change.
    pub fn add_after(&mut self, instance: &Instance, node: usize, after: usize) -> f64 {
        let delta = self.insertion_cost(instance, node, after);
        let next = self.nodes[after].next;
        let route = self.nodes[after].route;

        self.nodes[after].next = node;
        self.nodes[next].prev = node;
        self.nodes[after].modified = true;
        self.nodes[next].modified = true;

        let n = &mut self.nodes[node];
        n.prev = after;
        n.next = next;
        n.route = route;
        n.in_solution = true;
        n.modified = true;
        let demand = n.demand;

        let r = &mut self.routes[route];
        r.total_demand += demand;
        r.num_elements += 1;
        r.f_route += delta;
        r.modified = true;

        self.f += delta;
        delta
    }

    /// Reverse the path `a.next ..= b` of a route (2-opt); returns the cost change.
    pub fn reverse_segment(&mut self, instance: &Instance, a: usize, b: usize) -> f64 {
        let an = self.nodes[a].next;
        let bn = self.nodes[b].next;
        let route = self.nodes[a].route;
        let name = |i: usize| self.nodes[i].name;
        let delta = instance.dist(name(a), name(b)) + instance.dist(name(an), name(bn))
            - instance.dist(name(a), name(an))
            - instance.dist(name(b), name(bn));

        let mut x = an;
        loop {
            let n = &mut self.nodes[x];
            let following = n.next;
            std::mem::swap(&mut n.prev, &mut n.next);
            n.modified = true;
            if x == b {
                break;
            }
            x = following;
        }
        self.nodes[a].next = b;
        self.nodes[b].prev = a;
        self.nodes[an].next = bn;
        self.nodes[bn].prev = an;
        self.nodes[a].modified = true;
        self.nodes[bn].modified = true;

        let r = &mut self.routes[route];
        r.f_route += delta;
        r.modified = true;
        self.f += delta;
        delta
    }

    /// Append `node` at the end of route `slot`
    pub fn add_end(&mut self, instance: &Instance, slot: usize, node: usize) -> f64 {
        let last = self.nodes[self.routes[slot].depot].prev;
        self.add_after(instance, node, last)
    }

    /// Reset route `slot` to its depot alone. Customers still pointing to the
    /// route must be unplaced by the caller.
    pub fn clean_route(&mut self, slot: usize) {
        let depot = self.routes[slot].depot;
        let d = &mut self.nodes[depot];
        d.prev = depot;
        d.next = depot;
        d.route = slot;
        d.accumulated_demand = 0;
        self.f -= self.routes[slot].f_route;
        self.routes[slot].reset();
    }

    /// Unplace every customer and start over with `num_routes` empty routes
    pub fn clean_all(&mut self, num_routes: usize) {
        for c in 1..=self.num_customers {
            let n = &mut self.nodes[c];
            n.prev = c;
            n.next = c;
            n.route = NO_ROUTE;
            n.in_solution = false;
            n.modified = true;
        }
        for slot in 0..self.routes.len() {
            self.clean_route(slot);
        }
        self.num_routes = num_routes.min(self.routes.len());
        self.f = 0.0;
    }

    /// Activate one more (empty) route slot and return its index
    pub fn add_route(&mut self) -> Result<usize> {
        if self.num_routes >= self.routes.len() {
            return Err(SolverError::FleetExhausted { max_routes: self.routes.len() });
        }
        let slot = self.num_routes;
        self.clean_route(slot);
        self.num_routes += 1;
        Ok(slot)
    }

    /// Drop routes holding only their depot, keeping active slots contiguous
    pub fn remove_empty_routes(&mut self) {
        let mut i = 0;
        while i < self.num_routes {
            if self.routes[i].is_empty() {
                self.remove_route(i);
            } else {
                i += 1;
            }
        }
    }

    fn remove_route(&mut self, slot: usize) {
        let last = self.num_routes - 1;
        if slot != last {
            self.routes.swap(slot, last);
            self.relabel_route(slot);
            self.relabel_route(last);
        }
        self.num_routes -= 1;
    }

    /// Rewrite the slot number on a route record and all of its nodes
    fn relabel_route(&mut self, slot: usize) {
        self.routes[slot].name = slot;
        let depot = self.routes[slot].depot;
        let mut aux = depot;
        loop {
            self.nodes[aux].route = slot;
            aux = self.nodes[aux].next;
            if aux == depot {
                break;
            }
        }
    }

    /// Refresh the demand prefix sums of route `slot`
    pub fn set_accumulated_demand(&mut self, slot: usize) {
        let depot = self.routes[slot].depot;
        self.nodes[depot].accumulated_demand = 0;
        let mut acc = 0;
        let mut aux = self.nodes[depot].next;
        while aux != depot {
            acc += self.nodes[aux].demand;
            self.nodes[aux].accumulated_demand = acc;
            aux = self.nodes[aux].next;
        }
    }

    pub fn set_all_accumulated_demand(&mut self) {
        for slot in 0..self.num_routes {
            self.set_accumulated_demand(slot);
        }
    }

    /// Forget which routes and nodes were touched
    pub fn clear_modified(&mut self) {
        for n in self.nodes.iter_mut() {
            n.modified = false;
        }
        for r in self.routes.iter_mut() {
            r.modified = false;
        }
    }

    /// Flag every node of route `slot` (depot included) as modified
    pub fn mark_route_modified(&mut self, slot: usize) {
        self.routes[slot].modified = true;
        let depot = self.routes[slot].depot;
        let mut aux = depot;
        loop {
            self.nodes[aux].modified = true;
            aux = self.nodes[aux].next;
            if aux == depot {
                break;
            }
        }
    }

    // ------------------------------------------------------------------
    // Insertion position search
    // ------------------------------------------------------------------

    /// Cheapest anchor in route `slot` after which `node` can be inserted
    pub fn find_best_position(&self, instance: &Instance, slot: usize, node: usize) -> (usize, f64) {
        self.scan_positions(instance, slot, node, None)
    }

    /// Cheapest anchor in route `slot`, never `exception` itself
    pub fn find_best_position_except_after(
        &self,
        instance: &Instance,
        slot: usize,
        node: usize,
        exception: usize,
    ) -> usize {
        self.scan_positions(instance, slot, node, Some(exception)).0
    }

    /// Like [`Self::find_best_position_except_after`], restricted to the first
    /// `limit` nearest neighbours of `node` when the route is long enough.
    pub fn find_best_position_except_after_knn(
        &self,
        instance: &Instance,
        slot: usize,
        node: usize,
        exception: usize,
        limit: usize,
    ) -> usize {
        if self.routes[slot].num_elements <= limit {
            return self.find_best_position_except_after(instance, slot, node, exception);
        }

        let depot = self.routes[slot].depot;
        let knn = instance.knn(self.nodes[node].name);
        let mut best = depot;
        let mut lowest = f64::MAX;
        for &k in knn.iter().take(limit) {
            let anchor = if k == 0 {
                depot
            } else if k != self.nodes[exception].name && self.nodes[k].route == slot {
                k
            } else {
                continue;
            };
            let cost = self.insertion_cost(instance, node, anchor);
            if cost < lowest {
                lowest = cost;
                best = anchor;
            }
        }
        best
    }

    fn scan_positions(
        &self,
        instance: &Instance,
        slot: usize,
        node: usize,
        exception: Option<usize>,
    ) -> (usize, f64) {
        let depot = self.routes[slot].depot;
        let mut best = depot;
        let mut lowest = f64::MAX;
        let mut aux = depot;
        loop {
            if Some(aux) != exception {
                let cost = self.insertion_cost(instance, node, aux);
                if cost < lowest {
                    lowest = cost;
                    best = aux;
                }
            }
            aux = self.nodes[aux].next;
            if aux == depot {
                break;
            }
        }
        (best, lowest)
    }

    // ------------------------------------------------------------------
    // Checking and I/O
    // ------------------------------------------------------------------

    /// Recompute the travel cost of route `slot` from scratch
    pub fn route_cost(&self, instance: &Instance, slot: usize) -> f64 {
        let depot = self.routes[slot].depot;
        let mut f = 0.0;
        let mut aux = depot;
        loop {
            let next = self.nodes[aux].next;
            f += instance.dist(self.nodes[aux].name, self.nodes[next].name);
            aux = next;
            if aux == depot {
                break;
            }
        }
        f
    }

    /// Verify every incremental aggregate against a from-scratch recomputation.
    pub fn audit(
        &self,
        instance: &Instance,
        epsilon: f64,
        require_feasible: bool,
        forbid_empty: bool,
    ) -> std::result::Result<(), String> {
        let mut errors: Vec<String> = Vec::new();
        let mut sum_f = 0.0;
        let mut placed = 0usize;

        for (slot, route) in self.routes().iter().enumerate() {
            let depot = route.depot;
            if !self.nodes[depot].is_depot() {
                errors.push(format!("route {} does not start at a depot", slot));
                continue;
            }
            if route.name != slot {
                errors.push(format!("route {} carries name {}", slot, route.name));
            }

            let mut count = 0usize;
            let mut demand = 0i32;
            let mut aux = depot;
            loop {
                let n = &self.nodes[aux];
                if n.route != slot {
                    errors.push(format!("node {} in route {} points to route {}", n.name, slot, n.route));
                }
                if self.nodes[n.next].prev != aux {
                    errors.push(format!("broken link after node {} in route {}", n.name, slot));
                    break;
                }
                demand += n.demand;
                count += 1;
                aux = n.next;
                if aux == depot || count > self.nodes.len() {
                    break;
                }
            }

            let f = self.route_cost(instance, slot);
            sum_f += f;
            placed += count.saturating_sub(1);

            if (f - route.f_route).abs() > epsilon {
                errors.push(format!("route {}: f_route {} but recomputed {}", slot, route.f_route, f));
            }
            if demand != route.total_demand {
                errors.push(format!("route {}: demand {} but recomputed {}", slot, route.total_demand, demand));
            }
            if count != route.num_elements {
                errors.push(format!("route {}: {} elements but counted {}", slot, route.num_elements, count));
            }
            if forbid_empty && route.is_empty() {
                errors.push(format!("route {} is empty", slot));
            }
            if require_feasible && !route.is_feasible() {
                errors.push(format!(
                    "route {} overloaded: {} > {}",
                    slot, route.total_demand, route.capacity
                ));
            }
        }

        if (sum_f - self.f).abs() > epsilon {
            errors.push(format!("solution cost {} but routes sum to {}", self.f, sum_f));
        }
        if placed != self.num_customers {
            errors.push(format!("{} customers placed, expected {}", placed, self.num_customers));
        }
        for c in 1..=self.num_customers {
            let n = &self.nodes[c];
            if !n.in_solution || n.route >= self.num_routes {
                errors.push(format!("customer {} is not placed in an active route", c));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }

    /// Panic on an inconsistent solution in debug builds; no-op in release.
    pub fn debug_audit(&self, instance: &Instance, epsilon: f64, stage: &str, require_feasible: bool) {
        if cfg!(debug_assertions) {
            if let Err(msg) = self.audit(instance, epsilon, require_feasible, false) {
                panic!("inconsistent solution after {}: {}", stage, msg);
            }
        }
    }

    /// Rebuild the solution from explicit customer sequences.
    pub fn set_routes(&mut self, instance: &Instance, routes: &[Vec<usize>]) -> Result<()> {
        if routes.len() > self.routes.len() {
            return Err(SolverError::InvalidSolution(format!(
                "{} routes exceed the fleet ceiling {}",
                routes.len(),
                self.routes.len()
            )));
        }
        let mut seen = vec![false; self.num_customers + 1];
        for &c in routes.iter().flatten() {
            if c == 0 || c > self.num_customers {
                return Err(SolverError::InvalidSolution(format!("unknown customer {}", c)));
            }
            if seen[c] {
                return Err(SolverError::InvalidSolution(format!("customer {} visited twice", c)));
            }
            seen[c] = true;
        }
        if let Some(missing) = (1..=self.num_customers).find(|&c| !seen[c]) {
            return Err(SolverError::InvalidSolution(format!("customer {} is not visited", missing)));
        }

        self.clean_all(routes.len());
        for (slot, customers) in routes.iter().enumerate() {
            for &c in customers {
                self.add_end(instance, slot, c);
            }
        }
        self.remove_empty_routes();
        Ok(())
    }

    /// Load the `Route #k: ...` / `Cost x` text form produced by `Display`.
    pub fn load_text(&mut self, instance: &Instance, text: &str) -> Result<()> {
        let mut routes: Vec<Vec<usize>> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with("Cost") {
                break;
            }
            let (_, customers) = line
                .split_once(':')
                .ok_or_else(|| SolverError::InvalidSolution(format!("malformed line '{}'", line)))?;
            let route = customers
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<usize>()
                        .map_err(|_| SolverError::InvalidSolution(format!("invalid customer '{}'", tok)))
                })
                .collect::<Result<Vec<usize>>>()?;
            routes.push(route);
        }
        self.set_routes(instance, &routes)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, customers) in self.to_routes().iter().enumerate() {
            let ids: Vec<String> = customers.iter().map(|c| c.to_string()).collect();
            writeln!(f, "Route #{}: {}", k + 1, ids.join(" "))?;
        }
        writeln!(f, "Cost {}", self.f)
    }
}

/// Iterator over the customer arena indices of one route
pub struct RouteIter<'a> {
    nodes: &'a [Node],
    depot: usize,
    current: usize,
}

impl<'a> Iterator for RouteIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let next = self.nodes[self.current].next;
        if next == self.depot {
            None
        } else {
            self.current = next;
            Some(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_instances;

    fn two_route_solution(instance: &Instance) -> Solution {
        let mut solution = Solution::new(instance);
        solution.set_routes(instance, &[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        solution
    }

    #[test]
    fn test_new_solution_layout() {
        let instance = test_instances::six_customers();
        let solution = Solution::new(&instance);
        assert_eq!(solution.num_routes(), 2);
        assert_eq!(solution.max_routes(), 6);
        assert_eq!(solution.nodes().len(), 1 + 6 + 6);
        for slot in 0..solution.max_routes() {
            let depot = solution.depot_of(slot);
            assert!(solution.node(depot).is_depot());
            assert_eq!(solution.node(depot).next, depot);
        }
    }

    #[test]
    fn test_incremental_costs_match_recomputation() {
        let instance = test_instances::six_customers();
        let mut solution = two_route_solution(&instance);
        assert!(solution.audit(&instance, 1e-9, true, true).is_ok());

        let before = solution.f;
        let delta = solution.remove(&instance, 2);
        assert!((solution.f - (before + delta)).abs() < 1e-9);
        assert!(!solution.node(2).in_solution);

        let anchor = solution.depot_of(1);
        solution.add_after(&instance, 2, anchor);
        assert!(solution.audit(&instance, 1e-9, false, true).is_ok());
        assert_eq!(solution.route(1).total_demand, 9);
        assert_eq!(solution.to_routes()[1], vec![2, 4, 5, 6]);
    }

    #[test]
    fn test_copy_from_is_independent() {
        let instance = test_instances::six_customers();
        let reference = two_route_solution(&instance);
        let mut working = Solution::new(&instance);
        working.copy_from(&reference);
        assert_eq!(working.to_routes(), reference.to_routes());

        working.remove(&instance, 1);
        let depot = working.depot_of(1);
        working.add_after(&instance, 1, depot);
        assert_ne!(working.to_routes(), reference.to_routes());
        assert!(reference.audit(&instance, 1e-9, true, true).is_ok());
    }

    #[test]
    fn test_remove_empty_routes_relabels() {
        let instance = test_instances::six_customers();
        let mut solution = Solution::new(&instance);
        solution.set_routes(&instance, &[vec![1, 2], vec![3], vec![4, 5, 6]]).unwrap();
        solution.remove(&instance, 3);
        solution.remove_empty_routes();
        assert_eq!(solution.num_routes(), 2);
        for slot in 0..2 {
            assert_eq!(solution.route(slot).name, slot);
            for c in solution.route_nodes(slot) {
                assert_eq!(solution.node(c).route, slot);
            }
        }
        // Customer 3 is unplaced, so only the per-route checks hold
        let depot = solution.depot_of(0);
        solution.add_after(&instance, 3, depot);
        assert!(solution.audit(&instance, 1e-9, true, true).is_ok());
    }

    #[test]
    fn test_add_route_respects_ceiling() {
        let instance = test_instances::six_customers().with_max_routes(3);
        let mut solution = Solution::new(&instance);
        assert_eq!(solution.add_route().unwrap(), 2);
        assert!(matches!(solution.add_route(), Err(SolverError::FleetExhausted { max_routes: 3 })));
    }

    #[test]
    fn test_accumulated_demand() {
        let instance = test_instances::six_customers();
        let mut solution = two_route_solution(&instance);
        solution.set_all_accumulated_demand();
        assert_eq!(solution.node(1).accumulated_demand, 3);
        assert_eq!(solution.node(2).accumulated_demand, 6);
        assert_eq!(solution.node(3).accumulated_demand, 10);
        assert_eq!(solution.node(6).accumulated_demand, 6);
    }

    #[test]
    fn test_best_position_is_cheapest() {
        let instance = test_instances::six_customers();
        let mut solution = two_route_solution(&instance);
        solution.remove(&instance, 2);
        let (anchor, cost) = solution.find_best_position(&instance, 0, 2);
        let depot = solution.depot_of(0);
        let mut aux = depot;
        loop {
            assert!(cost <= solution.insertion_cost(&instance, 2, aux) + 1e-12);
            aux = solution.node(aux).next;
            if aux == depot {
                break;
            }
        }
        let except = solution.find_best_position_except_after(&instance, 0, 2, anchor);
        assert_ne!(except, anchor);
    }

    #[test]
    fn test_text_round_trip() {
        let instance = test_instances::six_customers();
        let solution = two_route_solution(&instance);
        let text = solution.to_string();
        assert!(text.starts_with("Route #1: 1 2 3\nRoute #2: 4 5 6\nCost "));

        let mut loaded = Solution::new(&instance);
        loaded.load_text(&instance, &text).unwrap();
        assert_eq!(loaded.to_routes(), solution.to_routes());
        assert!((loaded.f - solution.f).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_routes_rejected() {
        let instance = test_instances::six_customers();
        let mut solution = Solution::new(&instance);
        assert!(solution.set_routes(&instance, &[vec![1, 2, 3], vec![4, 5]]).is_err());
        assert!(solution.set_routes(&instance, &[vec![1, 2, 3, 3], vec![4, 5, 6]]).is_err());
        assert!(solution.load_text(&instance, "Route #1: 1 x\n").is_err());
    }

    #[test]
    fn test_audit_detects_drift() {
        let instance = test_instances::six_customers();
        let mut solution = two_route_solution(&instance);
        solution.f += 1.0;
        assert!(solution.audit(&instance, 0.01, true, true).is_err());
    }
}
