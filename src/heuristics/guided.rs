//! Guided Local Search (GLS).
//!
//! GLS alternates plain descents with penalties on the arcs of each local optimum.
//! The descent runs against an augmented objective
//! `d(i, j) + lambda * p(i, j)`, where `p` counts how often the arc has been penalised,
//! so arcs that keep showing up in local optima become progressively less attractive
//! and the search drifts into other regions of the tour space.
//!
//! At each local optimum the arcs with maximal utility `d(i, j) / (1 + p(i, j))` get
//! their penalty incremented. Lambda is fixed after the first descent as a fraction of
//! the average arc cost of that local optimum.
//!
//! The search always keeps the best tour seen under the *real* closed-cycle cost and only
//! replaces it on a strict improvement. After `reset_after` escalation rounds without a new
//! best, the penalties are cleared and the current tour restarts from the best one with a
//! small random kick.

use crate::config::SolverConfig;
use crate::error::SearchError;
use crate::heuristics::construction::{ConstructionHeuristic, PathCheapestArcHeuristic};
use crate::heuristics::local_search::{LocalSearch, VND};
use crate::instance::{ArcCost, RoutingInstance};
use crate::optimizer::TourSearch;
use crate::solution::Solution;
use crate::termination::Deadline;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Dense per-arc penalty counts, row-major by `(from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyMatrix {
    data: Vec<u32>,
    size: usize,
}

impl PenaltyMatrix {
    pub fn new(size: usize) -> Self {
        PenaltyMatrix {
            data: vec![0; size * size],
            size,
        }
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.data[from * self.size + to]
    }

    #[inline]
    fn increment(&mut self, from: usize, to: usize) {
        let cell = &mut self.data[from * self.size + to];
        *cell = cell.saturating_add(1);
    }

    /// Clear every penalty.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Sum of penalties over the arcs of a closed tour.
    #[cfg(test)]
    fn tour_penalty(&self, tour: &[usize]) -> u64 {
        arcs(tour).map(|(i, j)| self.get(i, j) as u64).sum()
    }

    #[cfg(test)]
    fn is_clear(&self) -> bool {
        self.data.iter().all(|&p| p == 0)
    }
}

/// Arcs of a closed tour, return arc included.
fn arcs(tour: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = tour.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |k| (tour[k], tour[(k + 1) % n]))
}

/// Real arc costs plus `lambda` times the arc penalty.
pub struct AugmentedCost<'a> {
    instance: &'a RoutingInstance,
    penalties: &'a PenaltyMatrix,
    lambda: f64,
}

impl<'a> AugmentedCost<'a> {
    pub fn new(instance: &'a RoutingInstance, penalties: &'a PenaltyMatrix, lambda: f64) -> Self {
        AugmentedCost {
            instance,
            penalties,
            lambda,
        }
    }
}

impl ArcCost for AugmentedCost<'_> {
    fn dimension(&self) -> usize {
        self.instance.dimension()
    }

    #[inline]
    fn arc(&self, from: usize, to: usize) -> f64 {
        self.instance.distance(from, to) as f64 + self.lambda * self.penalties.get(from, to) as f64
    }
}

/// Guided Local Search controller.
pub struct GuidedLocalSearch {
    /// Penalty weight relative to the average arc cost of the first local optimum
    pub lambda_coefficient: f64,
    /// Escalation rounds without a new best before penalties are cleared
    pub reset_after: usize,
    /// Random segment reversals applied on restart
    pub kick_strength: usize,
    /// Optional cap on escalation rounds
    pub max_iterations: Option<usize>,
    /// Random seed
    pub seed: u64,
    construction: Box<dyn ConstructionHeuristic + Send + Sync>,
    local_search: VND,
}

impl GuidedLocalSearch {
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        GuidedLocalSearch {
            lambda_coefficient: config.lambda_coefficient,
            reset_after: config.reset_after.max(1),
            kick_strength: config.kick_strength,
            max_iterations: config.max_iterations,
            seed: config.seed,
            construction: Box::new(PathCheapestArcHeuristic::new()),
            local_search: VND::with_standard_operators(),
        }
    }

    /// Replace the seed heuristic.
    pub fn with_construction<H: ConstructionHeuristic + Send + Sync + 'static>(mut self, heuristic: H) -> Self {
        self.construction = Box::new(heuristic);
        self
    }

    /// Increment the penalty of the maximum-utility arcs of `tour`. Ties are all penalised.
    fn penalize(&self, instance: &RoutingInstance, penalties: &mut PenaltyMatrix, tour: &[usize]) {
        const EPSILON: f64 = 1e-9;

        let utility = |(i, j): (usize, usize)| {
            instance.distance(i, j) as f64 / (1.0 + penalties.get(i, j) as f64)
        };

        let max_utility = match arcs(tour).map(|arc| OrderedFloat(utility(arc))).max() {
            Some(OrderedFloat(u)) => u,
            None => return,
        };

        let candidates: Vec<(usize, usize)> = arcs(tour)
            .filter(|&arc| (utility(arc) - max_utility).abs() < EPSILON)
            .collect();

        for (i, j) in candidates {
            penalties.increment(i, j);
        }
    }

    /// Reverse `kick_strength` random customer segments.
    fn kick(&self, tour: &mut [usize], rng: &mut ChaCha8Rng) {
        let n = tour.len();
        if n < 4 {
            return;
        }

        for _ in 0..self.kick_strength {
            let i = rng.gen_range(1..n - 1);
            let j = rng.gen_range(i + 1..n);
            tour[i..=j].reverse();
        }
    }

    fn within_iteration_cap(&self, iteration: usize) -> bool {
        self.max_iterations.map_or(true, |max| iteration < max)
    }
}

impl Default for GuidedLocalSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Best tour under the real objective. Only ever replaced by a strictly cheaper tour.
struct Incumbent {
    tour: Vec<usize>,
    cost: u64,
}

impl Incumbent {
    fn offer(&mut self, tour: &[usize], cost: u64) -> bool {
        if cost < self.cost {
            self.tour = tour.to_vec();
            self.cost = cost;
            true
        } else {
            false
        }
    }
}

impl TourSearch for GuidedLocalSearch {
    fn search(&self, instance: &RoutingInstance, deadline: &Deadline) -> Result<Solution, SearchError> {
        let start = std::time::Instant::now();
        let n = instance.dimension();

        let initial = self.construction.construct(instance);
        if !initial.is_complete(instance) {
            return Err(SearchError::NoFeasibleTour {
                visited: initial.tour.len(),
                expected: n,
            });
        }
        log::debug!("{} seed: {:?} (cycle cost {})", self.construction.name(), initial.tour, initial.cost);

        let mut best = Incumbent {
            tour: initial.tour.clone(),
            cost: initial.cost,
        };
        let mut current = initial.tour;
        let mut penalties = PenaltyMatrix::new(n);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut lambda = 0.0;
        let mut iteration = 0;
        let mut stale_rounds = 0;

        if !deadline.is_expired() {
            self.local_search.improve(instance, &mut current);
            let cost = instance.tour_cost(&current);
            best.offer(&current, cost);
            lambda = self.lambda_coefficient * cost as f64 / n.max(1) as f64;
        }

        while !deadline.is_expired() && self.within_iteration_cap(iteration) {
            iteration += 1;

            self.penalize(instance, &mut penalties, &current);
            {
                let augmented = AugmentedCost::new(instance, &penalties, lambda);
                self.local_search.improve(&augmented, &mut current);
            }

            let cost = instance.tour_cost(&current);
            if best.offer(&current, cost) {
                log::debug!("GLS iteration {}: new best {} {:?}", iteration, cost, current);
                stale_rounds = 0;
            } else {
                stale_rounds += 1;
            }

            if stale_rounds >= self.reset_after {
                penalties.reset();
                current = best.tour.clone();
                self.kick(&mut current, &mut rng);
                self.local_search.improve(instance, &mut current);
                let cost = instance.tour_cost(&current);
                if best.offer(&current, cost) {
                    log::debug!("GLS restart {}: new best {}", iteration, cost);
                }
                stale_rounds = 0;
            }
        }

        log::debug!(
            "GLS stopped after {} iterations in {:.3}s (deadline expired: {})",
            iteration,
            deadline.elapsed().as_secs_f64(),
            deadline.is_expired()
        );

        let mut solution = Solution::from_tour(instance, best.tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(iteration);
        Ok(solution)
    }

    fn name(&self) -> &str {
        "GuidedLocalSearch"
    }
}
