//! Module for parsing and representing CVRP instances.
//!
//! This module handles the CVRPLIB format files (Augerat, Uchoa et al.).
//! It supports Euclidean 2D distances, optionally rounded to the nearest
//! integer, and precomputes the distance matrix and the K-nearest-neighbour
//! lists used by the local search and the perturbation operators.

use crate::error::{Result, SolverError};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Default length of the nearest-neighbour lists
pub const DEFAULT_KNN_LIMIT: usize = 100;

/// A depot or customer location of the instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Internal identifier (0 = depot, 1..n = customers)
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Demand to be served (always 0 for the depot)
    pub demand: i32,
}

impl Location {
    pub fn new(id: usize, x: f64, y: f64, demand: i32) -> Self {
        Location { id, x, y, demand }
    }

    /// Check if this location is the depot
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }
}

/// Represents a complete CVRP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Number of nodes (including depot)
    pub dimension: usize,
    /// Vehicle capacity
    pub capacity: i32,
    /// Depot first, then customers in file order
    pub locations: Vec<Location>,
    /// Whether distances are rounded to the nearest integer
    pub rounded: bool,
    /// Whether the locations carry real coordinates
    pub has_coordinates: bool,
    /// Precomputed distance matrix
    #[serde(skip)]
    distance_matrix: Vec<Vec<f64>>,
    /// Nearest neighbours of every node, closest first (0 = depot)
    #[serde(skip)]
    knn: Vec<Vec<usize>>,
    /// Lower bound on the fleet size: ceil(total demand / capacity)
    min_routes: usize,
    /// Upper bound on the fleet size
    max_routes: usize,
}

impl Instance {
    /// Build an instance from locations; location 0 must be the depot.
    pub fn new(name: &str, locations: Vec<Location>, capacity: i32, rounded: bool) -> Result<Self> {
        let distance_matrix = Self::compute_distance_matrix(&locations, rounded);
        Self::assemble(name, String::new(), locations, capacity, rounded, true, distance_matrix)
    }

    /// Build an instance from an explicit (symmetric) distance matrix and the
    /// demand of every node, depot first.
    pub fn from_matrix(
        name: &str,
        distance_matrix: Vec<Vec<f64>>,
        demands: &[i32],
        capacity: i32,
    ) -> Result<Self> {
        if distance_matrix.len() != demands.len()
            || distance_matrix.iter().any(|row| row.len() != demands.len())
        {
            return Err(SolverError::InvalidInstance(
                "distance matrix and demand vector sizes differ".to_string(),
            ));
        }
        let locations = demands
            .iter()
            .enumerate()
            .map(|(id, &demand)| Location::new(id, 0.0, 0.0, demand))
            .collect();
        Self::assemble(name, String::new(), locations, capacity, false, false, distance_matrix)
    }

    fn assemble(
        name: &str,
        comment: String,
        mut locations: Vec<Location>,
        capacity: i32,
        rounded: bool,
        has_coordinates: bool,
        distance_matrix: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if locations.len() < 2 {
            return Err(SolverError::InvalidInstance(
                "an instance needs a depot and at least one customer".to_string(),
            ));
        }
        if capacity <= 0 {
            return Err(SolverError::InvalidInstance(format!(
                "capacity must be positive, got {}",
                capacity
            )));
        }
        locations[0].demand = 0;
        for loc in locations.iter().skip(1) {
            if loc.demand < 0 {
                return Err(SolverError::InvalidInstance(format!(
                    "customer {} has negative demand {}",
                    loc.id, loc.demand
                )));
            }
            if loc.demand > capacity {
                return Err(SolverError::InvalidInstance(format!(
                    "customer {} demand {} exceeds capacity {}",
                    loc.id, loc.demand, capacity
                )));
            }
        }

        let total_demand: i64 = locations.iter().map(|l| l.demand as i64).sum();
        let min_routes = ((total_demand + capacity as i64 - 1) / capacity as i64).max(1) as usize;
        let dimension = locations.len();

        let mut instance = Instance {
            name: name.to_string(),
            comment,
            dimension,
            capacity,
            locations,
            rounded,
            has_coordinates,
            distance_matrix,
            knn: Vec::new(),
            min_routes,
            max_routes: dimension - 1,
        };
        instance.knn = instance.compute_knn(DEFAULT_KNN_LIMIT);
        Ok(instance)
    }

    /// Recompute the nearest-neighbour lists with a different length
    pub fn with_knn_limit(mut self, limit: usize) -> Self {
        self.knn = self.compute_knn(limit);
        self
    }

    /// Override the fleet ceiling; never below the minimum fleet
    pub fn with_max_routes(mut self, max_routes: usize) -> Self {
        self.max_routes = max_routes.max(self.min_routes);
        self
    }

    /// Parse a CVRP instance from a CVRPLIB file with rounded distances
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with(path, true)
    }

    /// Parse a CVRP instance from a CVRPLIB file
    pub fn from_file_with<P: AsRef<Path>>(path: P, rounded: bool) -> Result<Self> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut name = String::new();
        let mut comment = String::new();
        let mut dimension = 0usize;
        let mut capacity = 0i32;
        let mut coords: Vec<(usize, f64, f64)> = Vec::new();
        let mut demands: Vec<(usize, i32)> = Vec::new();
        let mut depot_id = 1usize;

        let mut section = Section::Header;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                section = Section::Coords;
                continue;
            }
            if line.starts_with("DEMAND_SECTION") {
                section = Section::Demands;
                continue;
            }
            if line.starts_with("DEPOT_SECTION") {
                section = Section::Depot;
                continue;
            }
            if line.ends_with("_SECTION") {
                section = Section::Ignored;
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "COMMENT" => comment = value.to_string(),
                    "DIMENSION" => {
                        dimension = value
                            .parse()
                            .map_err(|_| SolverError::Parse(format!("invalid dimension '{}'", value)))?;
                    }
                    "CAPACITY" => {
                        capacity = value
                            .parse()
                            .map_err(|_| SolverError::Parse(format!("invalid capacity '{}'", value)))?;
                    }
                    "EDGE_WEIGHT_TYPE" => {
                        if value != "EUC_2D" {
                            return Err(SolverError::Parse(format!(
                                "unsupported edge weight type '{}'",
                                value
                            )));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match section {
                Section::Coords if parts.len() >= 3 => {
                    let id = parse_field::<usize>(parts[0], "node id")?;
                    let x = parse_field::<f64>(parts[1], "x coordinate")?;
                    let y = parse_field::<f64>(parts[2], "y coordinate")?;
                    coords.push((id, x, y));
                }
                Section::Demands if parts.len() >= 2 => {
                    let id = parse_field::<usize>(parts[0], "node id")?;
                    let demand = parse_field::<i32>(parts[1], "demand")?;
                    demands.push((id, demand));
                }
                Section::Depot => {
                    let id = parse_field::<i64>(parts[0], "depot id")?;
                    if id > 0 {
                        depot_id = id as usize;
                    }
                }
                _ => {}
            }
        }

        if dimension == 0 {
            dimension = coords.len();
        }
        if coords.len() != dimension {
            return Err(SolverError::Parse(format!(
                "expected {} coordinates, found {}",
                dimension,
                coords.len()
            )));
        }
        if !coords.iter().any(|(id, _, _)| *id == depot_id) {
            return Err(SolverError::Parse(format!("depot {} has no coordinates", depot_id)));
        }

        // Depot first, customers keep their relative file order.
        let mut ordered: Vec<(usize, f64, f64)> = Vec::with_capacity(dimension);
        ordered.extend(coords.iter().filter(|(id, _, _)| *id == depot_id).cloned());
        ordered.extend(coords.iter().filter(|(id, _, _)| *id != depot_id).cloned());

        let locations: Vec<Location> = ordered
            .iter()
            .enumerate()
            .map(|(internal, (file_id, x, y))| {
                let demand = demands
                    .iter()
                    .find(|(did, _)| did == file_id)
                    .map(|(_, d)| *d)
                    .unwrap_or(0);
                Location::new(internal, *x, *y, demand)
            })
            .collect();

        let distance_matrix = Self::compute_distance_matrix(&locations, rounded);
        Self::assemble(&name, comment, locations, capacity, rounded, true, distance_matrix)
    }

    /// Compute the Euclidean distance matrix
    fn compute_distance_matrix(locations: &[Location], rounded: bool) -> Vec<Vec<f64>> {
        let n = locations.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dx = locations[i].x - locations[j].x;
                    let dy = locations[i].y - locations[j].y;
                    let d = (dx * dx + dy * dy).sqrt();
                    matrix[i][j] = if rounded { (d + 0.5).floor() } else { d };
                }
            }
        }

        matrix
    }

    /// Every node's `limit` nearest other nodes, ties broken by id
    fn compute_knn(&self, limit: usize) -> Vec<Vec<usize>> {
        let limit = limit.min(self.dimension - 1);
        (0..self.dimension)
            .map(|i| {
                let mut others: Vec<usize> = (0..self.dimension).filter(|&j| j != i).collect();
                others.sort_by_key(|&j| (OrderedFloat(self.distance_matrix[i][j]), j));
                others.truncate(limit);
                others
            })
            .collect()
    }

    /// Get the distance between two nodes
    #[inline]
    pub fn dist(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Demand of a node (0 for the depot)
    #[inline]
    pub fn demand(&self, i: usize) -> i32 {
        self.locations[i].demand
    }

    /// Nearest neighbours of a node, closest first
    #[inline]
    pub fn knn(&self, i: usize) -> &[usize] {
        &self.knn[i]
    }

    /// At most the first `limit` nearest neighbours of a node
    #[inline]
    pub fn knn_within(&self, i: usize, limit: usize) -> &[usize] {
        let list = &self.knn[i];
        &list[..limit.min(list.len())]
    }

    /// Length of the precomputed neighbour lists
    pub fn knn_len(&self) -> usize {
        self.knn.first().map_or(0, Vec::len)
    }

    /// Number of nodes including the depot
    #[inline]
    pub fn size(&self) -> usize {
        self.dimension
    }

    /// Get the number of customer nodes (excluding depot)
    pub fn num_customers(&self) -> usize {
        self.dimension - 1
    }

    pub fn min_routes(&self) -> usize {
        self.min_routes
    }

    pub fn max_routes(&self) -> usize {
        self.max_routes
    }

    pub fn total_demand(&self) -> i64 {
        self.locations.iter().map(|l| l.demand as i64).sum()
    }

    /// Best known objective announced in the COMMENT line, e.g.
    /// `(Augerat et al, No of trucks: 5, Optimal value: 784)`
    pub fn best_known(&self) -> Option<f64> {
        ["Optimal value:", "Best value:"].iter().find_map(|tag| {
            let start = self.comment.find(tag)? + tag.len();
            let digits: String = self.comment[start..]
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            digits.parse().ok()
        })
    }

    /// Compute a summary of the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let demands: Vec<i32> = self.locations.iter().skip(1).map(|l| l.demand).collect();
        let total_demand = self.total_demand();
        let max_demand = demands.iter().copied().max().unwrap_or(0);
        let avg_demand = total_demand as f64 / demands.len() as f64;

        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.dist(i, j));
            }
        }
        let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            capacity: self.capacity,
            total_demand,
            max_demand,
            avg_demand,
            min_routes: self.min_routes,
            max_routes: self.max_routes,
            avg_distance,
            max_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Coords,
    Demands,
    Depot,
    Ignored,
}

fn parse_field<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| SolverError::Parse(format!("invalid {} '{}'", what, raw)))
}

/// Statistics about a CVRP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub capacity: i32,
    pub total_demand: i64,
    pub max_demand: i32,
    pub avg_demand: f64,
    pub min_routes: usize,
    pub max_routes: usize,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Nodes: {} (1 depot + {} customers)", self.dimension, self.dimension - 1)?;
        writeln!(f, "  Capacity: {}", self.capacity)?;
        writeln!(f, "  Total demand: {}", self.total_demand)?;
        writeln!(f, "  Avg / max demand: {:.2} / {}", self.avg_demand, self.max_demand)?;
        writeln!(f, "  Fleet bounds: {}..={}", self.min_routes, self.max_routes)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

/// Small instances shared by the unit tests of the crate.
#[cfg(test)]
pub(crate) mod test_instances {
    use super::*;

    /// Six customers on two clusters, capacity 10, demands [3,3,4,2,2,2].
    pub fn six_customers() -> Instance {
        let locations = vec![
            Location::new(0, 0.0, 0.0, 0),
            Location::new(1, 10.0, 0.0, 3),
            Location::new(2, 12.0, 2.0, 3),
            Location::new(3, 11.0, -3.0, 4),
            Location::new(4, -10.0, 1.0, 2),
            Location::new(5, -12.0, -2.0, 2),
            Location::new(6, -9.0, 4.0, 2),
        ];
        Instance::new("six", locations, 10, false).unwrap()
    }

    /// `n` customers on a deterministic pseudo-random grid with unit-ish demands.
    pub fn scattered(n: usize, capacity: i32) -> Instance {
        let mut locations = vec![Location::new(0, 50.0, 50.0, 0)];
        for i in 1..=n {
            let x = ((i * 37) % 101) as f64;
            let y = ((i * 59 + 13) % 97) as f64;
            let demand = 1 + (i % 5) as i32;
            locations.push(Location::new(i, x, y, demand));
        }
        Instance::new("scattered", locations, capacity, false).unwrap()
    }
}
