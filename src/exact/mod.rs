//! Exact reference solver.
//!
//! Enumerates every visiting order with the depot fixed first. With at most ten nodes
//! that is 9! = 362 880 orders, which is fine for benchmarking and tests but is not
//! used by the optimizer itself.

use crate::error::{OptimizeError, Result};
use crate::instance::RoutingInstance;
use crate::request::MAX_LOCATIONS;
use crate::solution::SolveOutcome;

#[derive(Debug, Clone)]
pub struct ExactResult {
    pub outcome: SolveOutcome,
    /// Number of complete orders evaluated
    pub orders_explored: u64,
    /// Computation time in seconds
    pub computation_time: f64,
}

/// Brute-force enumeration of all tours starting at the depot.
pub struct BruteForceSolver {
    pub max_nodes: usize,
}

impl BruteForceSolver {
    pub fn new() -> Self {
        BruteForceSolver {
            max_nodes: MAX_LOCATIONS,
        }
    }

    /// Optimal order under round-trip or open-path cost. Ties keep the
    /// lexicographically smallest order.
    pub fn solve(&self, instance: &RoutingInstance, round_trip: bool) -> Result<ExactResult> {
        let start = std::time::Instant::now();
        let n = instance.dimension();
        if n > self.max_nodes {
            return Err(OptimizeError::TooManyLocations {
                max: self.max_nodes,
                found: n,
            });
        }

        let cost_of = |tour: &[usize]| {
            if round_trip {
                instance.tour_cost(tour)
            } else {
                instance.path_cost(tour)
            }
        };

        let mut tour: Vec<usize> = (0..n).collect();
        let mut best_tour = tour.clone();
        let mut best_cost = cost_of(&tour);
        let mut explored = 1u64;

        if n > 2 {
            while next_permutation(&mut tour[1..]) {
                explored += 1;
                let cost = cost_of(&tour);
                if cost < best_cost {
                    best_cost = cost;
                    best_tour.copy_from_slice(&tour);
                }
            }
        }

        Ok(ExactResult {
            outcome: SolveOutcome::new(best_tour, best_cost),
            orders_explored: explored,
            computation_time: start.elapsed().as_secs_f64(),
        })
    }
}

impl Default for BruteForceSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Rearrange into the next lexicographic permutation. Returns false after the last one.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_permutation_counts() {
        let mut items = vec![1, 2, 3, 4];
        let mut count = 1;
        while next_permutation(&mut items) {
            count += 1;
        }
        assert_eq!(count, 24);
        assert_eq!(items, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_exact_open_path() {
        let instance = RoutingInstance::from_rows(
            "chain",
            vec![vec![0, 10, 100], vec![10, 0, 10], vec![100, 10, 0]],
        )
        .unwrap();
        let result = BruteForceSolver::new().solve(&instance, false).unwrap();
        assert_eq!(result.outcome.optimized_order, vec![0, 1, 2]);
        assert_eq!(result.outcome.total_distance, 20);
        assert_eq!(result.orders_explored, 2);
    }

    #[test]
    fn test_exact_asymmetric_round_trip() {
        let instance = RoutingInstance::from_rows(
            "ring",
            vec![vec![0, 10, 1, 10], vec![10, 0, 10, 1], vec![10, 1, 0, 10], vec![1, 10, 10, 0]],
        )
        .unwrap();
        let result = BruteForceSolver::new().solve(&instance, true).unwrap();
        assert_eq!(result.outcome.optimized_order, vec![0, 2, 1, 3]);
        assert_eq!(result.outcome.total_distance, 4);
    }

    #[test]
    fn test_rejects_large_instances() {
        let instance = RoutingInstance::from_rows("big", vec![vec![1; 11]; 11]).unwrap();
        assert!(BruteForceSolver::new().solve(&instance, true).is_err());
    }
}
