//! Engine entry point.
//!
//! `Optimizer` owns the time budget and the search, handles degenerate sizes without
//! searching, and falls back to the identity order when the search fails outright.
//! Each call is independent: no state is carried between `solve` calls.

use crate::config::SolverConfig;
use crate::error::{Result, SearchError};
use crate::extract::extract_outcome;
use crate::heuristics::guided::GuidedLocalSearch;
use crate::instance::RoutingInstance;
use crate::request::OptimizationRequest;
use crate::solution::{Solution, SolveOutcome};
use crate::termination::Deadline;
use rayon::prelude::*;

/// A search that turns an instance into a complete closed tour before a deadline.
pub trait TourSearch: Send + Sync {
    fn search(&self, instance: &RoutingInstance, deadline: &Deadline) -> std::result::Result<Solution, SearchError>;
    fn name(&self) -> &str;
}

pub struct Optimizer {
    config: SolverConfig,
    search: Box<dyn TourSearch>,
}

impl Optimizer {
    /// Guided local search with the default 5 second budget.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        let search = GuidedLocalSearch::from_config(&config);
        Optimizer {
            config,
            search: Box::new(search),
        }
    }

    /// Use a custom search backend.
    pub fn with_search<S: TourSearch + 'static>(config: SolverConfig, search: S) -> Self {
        Optimizer {
            config,
            search: Box::new(search),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve one instance. Never fails: search failures fall back to the identity order.
    pub fn solve(&self, instance: &RoutingInstance, round_trip: bool) -> SolveOutcome {
        let n = instance.dimension();
        match n {
            0 => SolveOutcome::empty(),
            1 => SolveOutcome::new(vec![0], 0),
            2 => extract_outcome(instance, &[0, 1], round_trip),
            _ => self.search_and_extract(instance, round_trip),
        }
    }

    fn search_and_extract(&self, instance: &RoutingInstance, round_trip: bool) -> SolveOutcome {
        let n = instance.dimension();
        log::info!(
            "Solving TSP for {} locations, round_trip={} ({})",
            n,
            round_trip,
            self.search.name()
        );

        let deadline = self.config.time_budget().start();
        let solution = match self.search.search(instance, &deadline) {
            Ok(solution) if solution.is_complete(instance) => solution,
            Ok(solution) => {
                log::warn!("Search returned an incomplete tour {:?}, using identity order", solution.tour);
                return identity_fallback(n);
            }
            Err(e) => {
                log::warn!("No solution found ({}), using identity order", e);
                return identity_fallback(n);
            }
        };

        let outcome = extract_outcome(instance, &solution.tour, round_trip);
        log::info!(
            "Solution found: {:?}, total_distance={} ({} iterations, {:.3}s)",
            outcome.optimized_order,
            outcome.total_distance,
            solution.iterations.unwrap_or(0),
            solution.computation_time
        );
        outcome
    }

    /// Solve a raw matrix, rejecting ragged input.
    pub fn solve_matrix(&self, rows: Vec<Vec<u64>>, round_trip: bool) -> Result<SolveOutcome> {
        let instance = RoutingInstance::from_rows("matrix", rows)?;
        Ok(self.solve(&instance, round_trip))
    }

    /// Validate and solve a request.
    pub fn solve_request(&self, request: &OptimizationRequest) -> Result<SolveOutcome> {
        request.validate()?;
        self.solve_matrix(request.distance_matrix.clone(), request.is_round_trip)
    }

    /// Solve independent requests in parallel; each gets its own full budget.
    pub fn solve_batch(&self, requests: &[OptimizationRequest]) -> Vec<Result<SolveOutcome>> {
        requests.par_iter().map(|request| self.solve_request(request)).collect()
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `[0, 1, ..., n-1]` with cost 0.
fn identity_fallback(n: usize) -> SolveOutcome {
    SolveOutcome::new((0..n).collect(), 0)
}

/// Solve a matrix with the default optimizer.
pub fn solve_tsp(rows: Vec<Vec<u64>>, round_trip: bool) -> Result<SolveOutcome> {
    Optimizer::new().solve_matrix(rows, round_trip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimizeError;
    use std::collections::HashSet;

    fn quick() -> Optimizer {
        Optimizer::with_config(SolverConfig::quick(10_000, 100))
    }

    fn recompute(rows: &[Vec<u64>], tour: &[usize], round_trip: bool) -> u64 {
        let mut total: u64 = tour.windows(2).map(|p| rows[p[0]][p[1]]).sum();
        if round_trip && tour.len() > 1 {
            total += rows[tour[tour.len() - 1]][tour[0]];
        }
        total
    }

    struct FailingSearch;

    impl TourSearch for FailingSearch {
        fn search(&self, _instance: &RoutingInstance, _deadline: &Deadline) -> std::result::Result<Solution, SearchError> {
            Err(SearchError::Backend("solver crashed".to_string()))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    struct ScramblingSearch;

    impl TourSearch for ScramblingSearch {
        fn search(&self, instance: &RoutingInstance, _deadline: &Deadline) -> std::result::Result<Solution, SearchError> {
            Ok(Solution::from_tour(instance, vec![1, 0, 0], "Scrambling"))
        }

        fn name(&self) -> &str {
            "Scrambling"
        }
    }

    #[test]
    fn test_empty_matrix() {
        let outcome = quick().solve_matrix(vec![], true).unwrap();
        assert!(outcome.optimized_order.is_empty());
        assert_eq!(outcome.total_distance, 0);
    }

    #[test]
    fn test_single_location() {
        let outcome = quick().solve_matrix(vec![vec![0]], true).unwrap();
        assert_eq!(outcome.optimized_order, vec![0]);
        assert_eq!(outcome.total_distance, 0);
    }

    #[test]
    fn test_two_locations() {
        let optimizer = quick();
        let round = optimizer.solve_matrix(vec![vec![0, 100], vec![100, 0]], true).unwrap();
        assert_eq!(round.optimized_order, vec![0, 1]);
        assert_eq!(round.total_distance, 200);

        let one_way = optimizer.solve_matrix(vec![vec![0, 100], vec![100, 0]], false).unwrap();
        assert_eq!(one_way.optimized_order, vec![0, 1]);
        assert_eq!(one_way.total_distance, 100);
    }

    #[test]
    fn test_two_locations_asymmetric() {
        let optimizer = quick();
        let rows = vec![vec![0, 100], vec![150, 0]];
        assert_eq!(optimizer.solve_matrix(rows.clone(), true).unwrap().total_distance, 250);
        assert_eq!(optimizer.solve_matrix(rows, false).unwrap().total_distance, 100);
    }

    #[test]
    fn test_three_locations_obvious_route() {
        let rows = vec![vec![0, 10, 100], vec![10, 0, 10], vec![100, 10, 0]];
        let outcome = quick().solve_matrix(rows, false).unwrap();
        assert_eq!(outcome.optimized_order, vec![0, 1, 2]);
        assert_eq!(outcome.total_distance, 20);
    }

    #[test]
    fn test_three_locations_round_trip() {
        let rows = vec![vec![0, 100, 100], vec![100, 0, 100], vec![100, 100, 0]];
        let outcome = quick().solve_matrix(rows, true).unwrap();
        let visited: HashSet<usize> = outcome.optimized_order.iter().cloned().collect();
        assert_eq!(outcome.optimized_order.len(), 3);
        assert_eq!(visited, (0..3).collect());
        assert_eq!(outcome.total_distance, 300);
    }

    #[test]
    fn test_visits_all_locations_from_depot() {
        let rows = vec![
            vec![0, 10, 20, 30, 40],
            vec![10, 0, 15, 25, 35],
            vec![20, 15, 0, 12, 22],
            vec![30, 25, 12, 0, 18],
            vec![40, 35, 22, 18, 0],
        ];
        for round_trip in [true, false] {
            let outcome = quick().solve_matrix(rows.clone(), round_trip).unwrap();
            let visited: HashSet<usize> = outcome.optimized_order.iter().cloned().collect();
            assert_eq!(outcome.optimized_order.len(), 5);
            assert_eq!(visited, (0..5).collect());
            assert_eq!(outcome.optimized_order[0], 0);
            assert_eq!(outcome.total_distance, recompute(&rows, &outcome.optimized_order, round_trip));
        }
    }

    #[test]
    fn test_reported_cost_matches_tour_on_asymmetric_matrix() {
        let rows = vec![
            vec![0, 12, 29, 22, 13, 24, 7],
            vec![15, 0, 19, 3, 25, 6, 31],
            vec![29, 17, 0, 21, 12, 15, 8],
            vec![20, 3, 23, 0, 9, 14, 26],
            vec![13, 28, 12, 9, 0, 40, 11],
            vec![24, 6, 15, 14, 42, 0, 19],
            vec![9, 33, 5, 27, 10, 21, 0],
        ];
        let optimizer = quick();
        let open = optimizer.solve_matrix(rows.clone(), false).unwrap();
        let closed = optimizer.solve_matrix(rows.clone(), true).unwrap();

        assert_eq!(open.total_distance, recompute(&rows, &open.optimized_order, false));
        assert_eq!(closed.total_distance, recompute(&rows, &closed.optimized_order, true));
        // Same seed, same search: the tour is shared and only the return arc differs.
        assert_eq!(open.optimized_order, closed.optimized_order);
        assert!(closed.total_distance >= open.total_distance);
    }

    #[test]
    fn test_round_trip_includes_return() {
        let rows = vec![vec![0, 10, 100], vec![10, 0, 10], vec![100, 10, 0]];
        let optimizer = quick();
        let one_way = optimizer.solve_matrix(rows.clone(), false).unwrap();
        let round = optimizer.solve_matrix(rows, true).unwrap();
        assert!(round.total_distance > one_way.total_distance);
    }

    #[test]
    fn test_oversized_costs_are_rejected_not_summed() {
        let big = u64::MAX / 2;
        let rows = vec![vec![0, big, big], vec![big, 0, big], vec![big, big, 0]];
        let err = quick().solve_matrix(rows, true).unwrap_err();
        assert!(matches!(err, OptimizeError::ArcCostOutOfRange { from: 0, to: 1, .. }));
    }

    #[test]
    fn test_solve_tsp_uses_default_optimizer() {
        let outcome = solve_tsp(vec![vec![0, 100], vec![150, 0]], true).unwrap();
        assert_eq!(outcome.optimized_order, vec![0, 1]);
        assert_eq!(outcome.total_distance, 250);

        let ragged = solve_tsp(vec![vec![0, 1], vec![1]], false);
        assert!(matches!(ragged, Err(OptimizeError::MalformedMatrix { row: 1, .. })));
    }

    #[test]
    fn test_search_failure_falls_back_to_identity() {
        let optimizer = Optimizer::with_search(SolverConfig::default(), FailingSearch);
        let rows = vec![vec![0, 4, 9, 2], vec![4, 0, 1, 7], vec![9, 1, 0, 3], vec![2, 7, 3, 0]];
        let outcome = optimizer.solve_matrix(rows, true).unwrap();
        assert_eq!(outcome.optimized_order, vec![0, 1, 2, 3]);
        assert_eq!(outcome.total_distance, 0);
    }

    #[test]
    fn test_incomplete_tour_falls_back_to_identity() {
        let optimizer = Optimizer::with_search(SolverConfig::default(), ScramblingSearch);
        let rows = vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]];
        let outcome = optimizer.solve_matrix(rows, false).unwrap();
        assert_eq!(outcome.optimized_order, vec![0, 1, 2]);
        assert_eq!(outcome.total_distance, 0);
    }

    #[test]
    fn test_degenerate_sizes_skip_search() {
        let optimizer = Optimizer::with_search(SolverConfig::default(), FailingSearch);
        let outcome = optimizer.solve_matrix(vec![vec![0, 7], vec![9, 0]], true).unwrap();
        assert_eq!(outcome.optimized_order, vec![0, 1]);
        assert_eq!(outcome.total_distance, 16);
    }

    #[test]
    fn test_time_budget_bounds_search() {
        let mut config = SolverConfig::default();
        config.time_limit_ms = 150;
        let optimizer = Optimizer::with_config(config);
        let rows: Vec<Vec<u64>> = (0..10u64)
            .map(|i| (0..10u64).map(|j| if i == j { 0 } else { (i * 7 + j * 13) % 50 + 1 }).collect())
            .collect();

        let start = std::time::Instant::now();
        let outcome = optimizer.solve_matrix(rows.clone(), true).unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(3));
        assert_eq!(outcome.optimized_order.len(), 10);
        assert_eq!(outcome.total_distance, recompute(&rows, &outcome.optimized_order, true));
    }

    #[test]
    fn test_solve_batch() {
        let requests = vec![
            OptimizationRequest::new(vec![vec![0, 100], vec![150, 0]], true),
            OptimizationRequest::new(vec![vec![0, 10, 100], vec![10, 0, 10], vec![100, 10, 0]], false),
            OptimizationRequest::new(vec![vec![0]], true),
        ];
        let results = quick().solve_batch(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().total_distance, 250);
        assert_eq!(results[1].as_ref().unwrap().total_distance, 20);
        assert!(results[2].is_err());
    }
}
