//! Turning a searched tour into the reported result.
//!
//! The search always prices tours as closed cycles. Open-path results are derived here
//! by dropping the return arc, never inside the search.

use crate::instance::RoutingInstance;
use crate::solution::SolveOutcome;

/// Build the outcome for `tour` under round-trip or open-path semantics.
///
/// The cost is the sum of consecutive arcs, plus the arc from the last node back to the
/// depot iff `round_trip`.
pub fn extract_outcome(instance: &RoutingInstance, tour: &[usize], round_trip: bool) -> SolveOutcome {
    let mut total = instance.path_cost(tour);
    if round_trip && tour.len() > 1 {
        total += instance.distance(tour[tour.len() - 1], tour[0]);
    }
    SolveOutcome::new(tour.to_vec(), total)
}
