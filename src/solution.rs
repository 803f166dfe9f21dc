//! Solution representation and manipulation.
//!
//! `Solution` is the working record the search passes around (tour, closed-cycle cost,
//! bookkeeping). `SolveOutcome` is the immutable result handed back to callers.

use crate::instance::{ArcCost, RoutingInstance};
use serde::{Deserialize, Serialize};

/// A tour under search, with its real closed-cycle cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Node indices, depot first, return leg implicit
    pub tour: Vec<usize>,
    /// Closed-cycle cost of the tour
    pub cost: u64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a solution from a tour
    pub fn from_tour(instance: &RoutingInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_cost(&tour);
        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if all nodes are visited exactly once, depot first
    pub fn is_complete(&self, instance: &RoutingInstance) -> bool {
        instance.is_complete(&self.tour)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cycle cost: {}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

/// Final answer of one optimization call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Visiting order, depot first
    pub optimized_order: Vec<usize>,
    /// Total cost under the requested round-trip or open-path semantics
    pub total_distance: u64,
}

impl SolveOutcome {
    pub fn new(optimized_order: Vec<usize>, total_distance: u64) -> Self {
        SolveOutcome {
            optimized_order,
            total_distance,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl std::fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Order: {:?}", self.optimized_order)?;
        write!(f, "Total distance: {}", self.total_distance)
    }
}

/// A neighbourhood move on a tour. Position 0 (the depot) is never moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Exchange the nodes at two positions
    Swap(usize, usize),
    /// Reverse the segment `i+1..=j`
    TwoOpt(usize, usize),
    /// Move one node from a position to before another
    Insertion(usize, usize),
    /// Move a segment (start, length) to before a position
    OrOpt(usize, usize, usize),
}

impl Move {
    /// Apply the move to a tour in place.
    pub fn apply(&self, tour: &mut Vec<usize>) {
        match *self {
            Move::Swap(i, j) => tour.swap(i, j),
            Move::TwoOpt(i, j) => tour[i + 1..=j].reverse(),
            Move::Insertion(from, to) => {
                let node = tour.remove(from);
                let insert_pos = if to > from { to - 1 } else { to };
                tour.insert(insert_pos, node);
            }
            Move::OrOpt(start, len, to) => {
                let segment: Vec<usize> = tour.drain(start..start + len).collect();
                let insert_pos = if to > start { to - len } else { to };
                for (i, node) in segment.into_iter().enumerate() {
                    tour.insert(insert_pos + i, node);
                }
            }
        }
    }

    /// Change in closed-cycle cost the move would cause.
    ///
    /// Costs may be asymmetric, so reversals change the direction of every inner arc;
    /// the delta is computed on a scratch copy rather than from the four boundary arcs.
    pub fn delta(&self, costs: &dyn ArcCost, tour: &[usize]) -> f64 {
        let mut candidate = tour.to_vec();
        self.apply(&mut candidate);
        costs.cycle_cost(&candidate) - costs.cycle_cost(tour)
    }
}
