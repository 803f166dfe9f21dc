//! Local search improvement heuristics.
//!
//! This module implements the neighbourhoods used by the optimizer:
//! - 2-opt (segment reversal)
//! - Node relocation
//! - Or-opt (segment relocation)
//! - Node swap
//! - Variable Neighbourhood Descent over all of them
//!
//! Every operator works against an [`ArcCost`] and treats the tour as a closed cycle.
//! Position 0 holds the depot and is never moved, so every accepted move yields
//! another complete tour starting at the depot.

use crate::instance::ArcCost;
use crate::solution::Move;

/// Minimum gain for a move to count as an improvement.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Upper bound on descent passes for a single operator call.
const MAX_PASSES: usize = 1_000;

/// Trait for local search improvement methods
pub trait LocalSearch {
    /// Improve `tour` in place under `costs`. Returns true if anything changed.
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool;
    fn name(&self) -> &str;
}

/// Pick the improving move from `candidates`: the first one found, or the best one.
fn select_move(
    costs: &dyn ArcCost,
    tour: &[usize],
    candidates: impl Iterator<Item = Move>,
    first_improvement: bool,
) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;

    for mv in candidates {
        let delta = mv.delta(costs, tour);
        if delta < -IMPROVEMENT_EPS && best.map_or(true, |(_, d)| delta < d) {
            best = Some((mv, delta));
            if first_improvement {
                break;
            }
        }
    }

    best.map(|(mv, _)| mv)
}

/// Repeatedly apply improving moves until none is left.
fn descend<F, I>(costs: &dyn ArcCost, tour: &mut Vec<usize>, first_improvement: bool, neighbourhood: F) -> bool
where
    F: Fn(usize) -> I,
    I: Iterator<Item = Move>,
{
    let mut total_improved = false;

    for _ in 0..MAX_PASSES {
        match select_move(costs, tour, neighbourhood(tour.len()), first_improvement) {
            Some(mv) => {
                mv.apply(tour);
                total_improved = true;
            }
            None => break,
        }
    }

    total_improved
}

/// 2-Opt Local Search
///
/// Reverses segments of the tour. With asymmetric costs a reversal also flips the
/// direction of every arc inside the segment, which the delta accounts for.
pub struct TwoOptSearch {
    /// Use first improvement instead of best improvement
    pub first_improvement: bool,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch { first_improvement: false }
    }

    pub fn first_improvement() -> Self {
        TwoOptSearch { first_improvement: true }
    }

    fn moves(n: usize) -> impl Iterator<Item = Move> {
        (0..n.saturating_sub(2)).flat_map(move |i| (i + 2..n).map(move |j| Move::TwoOpt(i, j)))
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool {
        if tour.len() < 3 {
            return false;
        }
        descend(costs, tour, self.first_improvement, Self::moves)
    }

    fn name(&self) -> &str {
        if self.first_improvement {
            "2-Opt-FI"
        } else {
            "2-Opt-BI"
        }
    }
}

/// Node Relocation Local Search
///
/// Moves a single node to another position in the tour.
pub struct RelocationSearch {
    pub first_improvement: bool,
}

impl RelocationSearch {
    pub fn new() -> Self {
        RelocationSearch { first_improvement: false }
    }

    pub fn first_improvement() -> Self {
        RelocationSearch { first_improvement: true }
    }

    fn moves(n: usize) -> impl Iterator<Item = Move> {
        (1..n).flat_map(move |from| {
            (1..=n)
                .filter(move |&to| to != from && to != from + 1)
                .map(move |to| Move::Insertion(from, to))
        })
    }
}

impl Default for RelocationSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for RelocationSearch {
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool {
        if tour.len() < 3 {
            return false;
        }
        descend(costs, tour, self.first_improvement, Self::moves)
    }

    fn name(&self) -> &str {
        "Relocation"
    }
}

/// Or-Opt Local Search
///
/// Relocates segments of 2 or 3 consecutive nodes; single nodes are left to
/// [`RelocationSearch`].
pub struct OrOptSearch {
    /// Maximum segment length to consider
    pub max_segment_length: usize,
    /// Use first improvement
    pub first_improvement: bool,
}

impl OrOptSearch {
    pub fn new() -> Self {
        OrOptSearch {
            max_segment_length: 3,
            first_improvement: false,
        }
    }

    pub fn first_improvement() -> Self {
        OrOptSearch {
            max_segment_length: 3,
            first_improvement: true,
        }
    }
}

impl Default for OrOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for OrOptSearch {
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool {
        if tour.len() < 4 {
            return false;
        }
        let max_len = self.max_segment_length;

        descend(costs, tour, self.first_improvement, move |n| {
            (2..=max_len.min(n - 2)).flat_map(move |len| {
                (1..=n - len).flat_map(move |start| {
                    (1..=n)
                        .filter(move |&to| to < start || to > start + len)
                        .map(move |to| Move::OrOpt(start, len, to))
                })
            })
        })
    }

    fn name(&self) -> &str {
        "Or-Opt"
    }
}

/// Node Swap Local Search
///
/// Exchanges the positions of two customer nodes.
pub struct SwapSearch {
    pub first_improvement: bool,
}

impl SwapSearch {
    pub fn new() -> Self {
        SwapSearch { first_improvement: false }
    }

    pub fn first_improvement() -> Self {
        SwapSearch { first_improvement: true }
    }

    fn moves(n: usize) -> impl Iterator<Item = Move> {
        (1..n.saturating_sub(1)).flat_map(move |i| (i + 1..n).map(move |j| Move::Swap(i, j)))
    }
}

impl Default for SwapSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for SwapSearch {
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool {
        if tour.len() < 3 {
            return false;
        }
        descend(costs, tour, self.first_improvement, Self::moves)
    }

    fn name(&self) -> &str {
        "Swap"
    }
}

/// Variable Neighborhood Descent (VND)
///
/// Applies the operators in order and restarts from the first one after every
/// improvement, stopping once no operator can improve the tour.
pub struct VND {
    operators: Vec<Box<dyn LocalSearch + Send + Sync>>,
}

impl VND {
    pub fn with_standard_operators() -> Self {
        let operators: Vec<Box<dyn LocalSearch + Send + Sync>> = vec![
            Box::new(TwoOptSearch::first_improvement()),
            Box::new(RelocationSearch::first_improvement()),
            Box::new(OrOptSearch::first_improvement()),
            Box::new(SwapSearch::first_improvement()),
        ];

        VND { operators }
    }
}

impl Default for VND {
    fn default() -> Self {
        Self::with_standard_operators()
    }
}

impl LocalSearch for VND {
    fn improve(&self, costs: &dyn ArcCost, tour: &mut Vec<usize>) -> bool {
        let mut total_improved = false;
        let mut k = 0;
        let mut total_iterations = 0;

        while k < self.operators.len() && total_iterations < MAX_PASSES {
            if self.operators[k].improve(costs, tour) {
                total_improved = true;
                k = 0;
            } else {
                k += 1;
            }
            total_iterations += 1;
        }

        total_improved
    }

    fn name(&self) -> &str {
        "VND"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::RoutingInstance;

    /// Five points on a line at 0, 1, 2, 3, 4; the optimal cycle costs 8.
    fn create_line_instance() -> RoutingInstance {
        let positions: [i64; 5] = [0, 1, 2, 3, 4];
        let rows = positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).unsigned_abs()).collect())
            .collect();
        RoutingInstance::from_rows("line", rows).unwrap()
    }

    fn assert_permutation(instance: &RoutingInstance, tour: &[usize]) {
        assert!(instance.is_complete(tour), "not a complete tour: {:?}", tour);
    }

    #[test]
    fn test_two_opt() {
        let instance = create_line_instance();
        let mut tour = vec![0, 3, 2, 1, 4];
        let before = instance.tour_cost(&tour);

        assert!(TwoOptSearch::new().improve(&instance, &mut tour));
        assert_permutation(&instance, &tour);
        assert!(instance.tour_cost(&tour) < before);
        assert_eq!(instance.tour_cost(&tour), 8);
    }

    #[test]
    fn test_relocation() {
        let instance = create_line_instance();
        let mut tour = vec![0, 2, 1, 3, 4];
        assert!(RelocationSearch::new().improve(&instance, &mut tour));
        assert_permutation(&instance, &tour);
        assert_eq!(instance.tour_cost(&tour), 8);
    }

    #[test]
    fn test_or_opt_moves_segment() {
        let instance = create_line_instance();
        let mut tour = vec![0, 3, 4, 1, 2];
        let before = instance.tour_cost(&tour);
        assert!(OrOptSearch::new().improve(&instance, &mut tour));
        assert_permutation(&instance, &tour);
        assert!(instance.tour_cost(&tour) < before);
    }

    #[test]
    fn test_swap() {
        let instance = create_line_instance();
        let mut tour = vec![0, 1, 3, 2, 4];
        assert!(SwapSearch::new().improve(&instance, &mut tour));
        assert_permutation(&instance, &tour);
        assert_eq!(instance.tour_cost(&tour), 8);
    }

    #[test]
    fn test_vnd_reaches_optimum_and_keeps_depot() {
        let instance = create_line_instance();
        let mut tour = vec![0, 4, 1, 3, 2];
        VND::with_standard_operators().improve(&instance, &mut tour);
        assert_eq!(tour[0], 0);
        assert_permutation(&instance, &tour);
        assert_eq!(instance.tour_cost(&tour), 8);
    }

    #[test]
    fn test_local_optimum_is_left_alone() {
        let instance = create_line_instance();
        let mut tour = vec![0, 1, 2, 3, 4];
        assert!(!VND::with_standard_operators().improve(&instance, &mut tour));
        assert_eq!(tour, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_asymmetric_reversal_is_priced_by_direction() {
        // Clockwise costs 1 per arc, counter-clockwise 10.
        let n = 4;
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { 0 } else if (i + 1) % n == j { 1 } else { 10 })
                    .collect()
            })
            .collect();
        let instance = RoutingInstance::from_rows("ring", rows).unwrap();

        let mut tour = vec![0, 3, 2, 1];
        assert_eq!(instance.tour_cost(&tour), 40);
        assert!(TwoOptSearch::new().improve(&instance, &mut tour));
        assert_eq!(tour, vec![0, 1, 2, 3]);
        assert_eq!(instance.tour_cost(&tour), 4);
    }
}
