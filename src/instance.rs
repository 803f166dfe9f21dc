//! Module for representing routing instances.
//!
//! A routing instance is a square matrix of directed integer arc costs over nodes
//! `0..N`, with node 0 fixed as the depot. Asymmetric matrices are kept as given.

use crate::error::{OptimizeError, Result};
use crate::request::OptimizationRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Anything that can price a directed arc between two nodes.
///
/// The real instance and the penalised objective of guided local search both
/// implement this, so neighbourhood operators work unchanged on either.
pub trait ArcCost {
    /// Number of nodes.
    fn dimension(&self) -> usize;

    /// Cost of the directed arc `from -> to`.
    fn arc(&self, from: usize, to: usize) -> f64;

    /// Cost of the tour taken as a closed cycle (last node back to the first).
    fn cycle_cost(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut cost = 0.0;
        for pair in tour.windows(2) {
            cost += self.arc(pair[0], pair[1]);
        }
        cost + self.arc(tour[tour.len() - 1], tour[0])
    }
}

/// Largest accepted arc cost. Tour sums over at most `N` such arcs stay within `u64`.
pub const MAX_ARC_COST: u64 = u32::MAX as u64;

/// Dense square matrix of non-negative directed arc costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    data: Vec<u64>,
    size: usize,
}

impl DistanceMatrix {
    /// Builds a matrix from rows, rejecting ragged input and arcs above [`MAX_ARC_COST`].
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(OptimizeError::MalformedMatrix {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            if let Some((col, &cost)) = values.iter().enumerate().find(|&(_, &c)| c > MAX_ARC_COST) {
                return Err(OptimizeError::ArcCostOutOfRange {
                    from: row,
                    to: col,
                    cost,
                    max: MAX_ARC_COST,
                });
            }
            data.extend(values);
        }

        Ok(DistanceMatrix { data, size })
    }

    /// Number of nodes covered by the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of the directed arc `from -> to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.data[from * self.size + to]
    }

    /// Copies the matrix back into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        self.data.chunks(self.size.max(1)).map(|row| row.to_vec()).collect()
    }

    /// True when every arc costs the same in both directions.
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// A single-vehicle, single-depot routing problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingInstance {
    /// Name of the instance
    pub name: String,
    /// Pairwise arc costs
    pub matrix: DistanceMatrix,
}

impl RoutingInstance {
    pub fn new(name: &str, matrix: DistanceMatrix) -> Self {
        RoutingInstance {
            name: name.to_string(),
            matrix,
        }
    }

    /// Convenience constructor from nested rows.
    pub fn from_rows(name: &str, rows: Vec<Vec<u64>>) -> Result<Self> {
        Ok(Self::new(name, DistanceMatrix::from_rows(rows)?))
    }

    /// Loads and validates an optimization request stored as JSON.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let request = OptimizationRequest::from_file(&path)?;
        request.validate()?;

        let name = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "request".to_string());
        let round_trip = request.is_round_trip;
        Ok((Self::from_rows(&name, request.distance_matrix)?, round_trip))
    }

    /// Number of nodes, depot included.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.matrix.size()
    }

    /// The depot is always node 0.
    #[inline]
    pub fn depot(&self) -> usize {
        0
    }

    /// Get the cost of the arc between two nodes
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> u64 {
        self.matrix.get(from, to)
    }

    /// Exact closed-cycle cost, including the return arc to the first node.
    pub fn tour_cost(&self, tour: &[usize]) -> u64 {
        if tour.len() < 2 {
            return 0;
        }
        self.path_cost(tour) + self.distance(tour[tour.len() - 1], tour[0])
    }

    /// Exact open-path cost, without any return arc.
    pub fn path_cost(&self, tour: &[usize]) -> u64 {
        tour.windows(2).map(|pair| self.distance(pair[0], pair[1])).sum()
    }

    /// Check that a tour visits every node exactly once and starts at the depot.
    pub fn is_complete(&self, tour: &[usize]) -> bool {
        let n = self.dimension();
        if tour.len() != n {
            return false;
        }
        if n == 0 {
            return true;
        }
        if tour[0] != self.depot() {
            return false;
        }

        let mut seen = vec![false; n];
        for &node in tour {
            if node >= n || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }
}

impl ArcCost for RoutingInstance {
    fn dimension(&self) -> usize {
        self.matrix.size()
    }

    #[inline]
    fn arc(&self, from: usize, to: usize) -> f64 {
        self.distance(from, to) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asymmetric() -> RoutingInstance {
        RoutingInstance::from_rows(
            "asym",
            vec![vec![0, 5, 9], vec![7, 0, 2], vec![1, 8, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_asymmetric_arcs_preserved() {
        let instance = asymmetric();
        assert_eq!(instance.distance(0, 1), 5);
        assert_eq!(instance.distance(1, 0), 7);
        assert!(!instance.matrix.is_symmetric());
        assert_eq!(instance.matrix.to_rows()[2], vec![1, 8, 0]);
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let err = DistanceMatrix::from_rows(vec![vec![0, 1], vec![1]]).unwrap_err();
        match err {
            OptimizeError::MalformedMatrix { row, expected, found } => {
                assert_eq!((row, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_oversized_arc_rejected() {
        let big = u64::MAX / 2;
        let err = RoutingInstance::from_rows("big", vec![vec![0, 1, 2], vec![1, 0, big], vec![2, 1, 0]]).unwrap_err();
        assert!(matches!(err, OptimizeError::ArcCostOutOfRange { from: 1, to: 2, .. }));

        let edge = vec![vec![0, MAX_ARC_COST], vec![MAX_ARC_COST, 0]];
        let instance = RoutingInstance::from_rows("edge", edge).unwrap();
        assert_eq!(instance.tour_cost(&[0, 1]), 2 * MAX_ARC_COST);
    }

    #[test]
    fn test_cycle_and_path_cost() {
        let instance = asymmetric();
        let tour = [0, 1, 2];
        assert_eq!(instance.path_cost(&tour), 5 + 2);
        assert_eq!(instance.tour_cost(&tour), 5 + 2 + 1);
        assert!((instance.cycle_cost(&tour) - 8.0).abs() < 1e-9);
        assert_eq!(instance.tour_cost(&[0]), 0);
        assert_eq!(instance.path_cost(&[]), 0);
    }

    #[test]
    fn test_is_complete() {
        let instance = asymmetric();
        assert!(instance.is_complete(&[0, 2, 1]));
        assert!(!instance.is_complete(&[1, 0, 2]));
        assert!(!instance.is_complete(&[0, 1, 1]));
        assert!(!instance.is_complete(&[0, 1]));
    }
}
