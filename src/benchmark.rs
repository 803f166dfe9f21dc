//! Benchmarking and experimentation module.
//!
//! Generates seeded random instances, runs the construction heuristics, plain VND and
//! the full optimizer on each, and compares every result with the exact optimum.

use crate::config::SolverConfig;
use crate::error::Result;
use crate::exact::BruteForceSolver;
use crate::heuristics::construction::*;
use crate::heuristics::local_search::{LocalSearch, VND};
use crate::instance::RoutingInstance;
use crate::optimizer::Optimizer;
use crate::solution::SolveOutcome;

use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Round-trip or open-path objective
    pub round_trip: bool,
    /// Reported cost
    pub cost: u64,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to the exact optimum, in percent
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_results: usize,
    /// Results matching the exact optimum
    pub num_optimal: usize,
    pub avg_cost: f64,
    pub std_cost: f64,
    pub avg_gap: Option<f64>,
    pub worst_gap: Option<f64>,
    pub avg_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of random instances
    pub num_instances: usize,
    /// Nodes per instance, depot included
    pub size: usize,
    /// Generate asymmetric matrices
    pub asymmetric: bool,
    /// Objective under test
    pub round_trip: bool,
    /// Solver settings for the optimizer runs
    pub solver: SolverConfig,
    /// Solve instances in parallel
    pub parallel: bool,
    /// Seed for instance generation
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_instances: 20,
            size: 8,
            asymmetric: true,
            round_trip: true,
            solver: SolverConfig::quick(1_000, 200),
            parallel: true,
            seed: 42,
        }
    }
}

/// Random instance with nodes on a 10 km grid, costs in meters.
///
/// Asymmetric instances add a per-direction detour of up to 30% to every arc.
pub fn random_instance(name: &str, size: usize, asymmetric: bool, seed: u64) -> Result<RoutingInstance> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..size)
        .map(|_| (rng.gen_range(0.0..10_000.0), rng.gen_range(0.0..10_000.0)))
        .collect();

    let mut rows = vec![vec![0u64; size]; size];
    for i in 0..size {
        for j in 0..size {
            if i == j {
                continue;
            }
            let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
            let mut d = (dx * dx + dy * dy).sqrt();
            if asymmetric {
                d *= 1.0 + rng.gen_range(0.0..0.3);
            }
            rows[i][j] = d.round() as u64;
        }
    }

    RoutingInstance::from_rows(name, rows)
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Generate the configured instances.
    pub fn generate_instances(&self) -> Result<Vec<RoutingInstance>> {
        (0..self.config.num_instances)
            .map(|k| {
                let name = format!("rand-{}-{}", self.config.size, k);
                random_instance(&name, self.config.size, self.config.asymmetric, self.config.seed + k as u64)
            })
            .collect()
    }

    /// Run every algorithm on one instance.
    pub fn run_instance(config: &BenchmarkConfig, instance: &RoutingInstance) -> Vec<AlgorithmResult> {
        let round_trip = config.round_trip;
        let exact = BruteForceSolver::new().solve(instance, round_trip).ok();
        let optimum = exact.as_ref().map(|e| e.outcome.total_distance);

        let record = |algorithm: &str, outcome: &SolveOutcome, time: f64| {
            let gap_to_best = optimum.filter(|&best| best > 0).map(|best| {
                (outcome.total_distance as f64 - best as f64) / best as f64 * 100.0
            });
            AlgorithmResult {
                algorithm: algorithm.to_string(),
                instance: instance.name.clone(),
                dimension: instance.dimension(),
                round_trip,
                cost: outcome.total_distance,
                time,
                gap_to_best,
            }
        };

        let mut results = Vec::new();

        let heuristics: Vec<Box<dyn ConstructionHeuristic + Send + Sync>> = vec![
            Box::new(PathCheapestArcHeuristic::new()),
            Box::new(CheapestInsertionHeuristic::new()),
        ];
        for heuristic in &heuristics {
            let solution = heuristic.construct(instance);
            let outcome = crate::extract::extract_outcome(instance, &solution.tour, round_trip);
            results.push(record(heuristic.name(), &outcome, solution.computation_time));

            let start = std::time::Instant::now();
            let mut tour = solution.tour.clone();
            let vnd = VND::with_standard_operators();
            vnd.improve(instance, &mut tour);
            let outcome = crate::extract::extract_outcome(instance, &tour, round_trip);
            let name = format!("{} + {}", heuristic.name(), vnd.name());
            results.push(record(&name, &outcome, start.elapsed().as_secs_f64()));
        }

        let start = std::time::Instant::now();
        let outcome = Optimizer::with_config(config.solver.clone()).solve(instance, round_trip);
        results.push(record("GuidedLocalSearch", &outcome, start.elapsed().as_secs_f64()));

        if let Some(exact) = exact {
            results.push(record("Exact", &exact.outcome, exact.computation_time));
        }

        results
    }

    /// Run all instances, optionally in parallel.
    pub fn run(&mut self, instances: &[RoutingInstance]) {
        let progress = ProgressBar::new(instances.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} instances ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let config = &self.config;
        let per_instance: Vec<Vec<AlgorithmResult>> = if config.parallel {
            instances
                .par_iter()
                .map(|instance| {
                    let results = Self::run_instance(config, instance);
                    progress.inc(1);
                    results
                })
                .collect()
        } else {
            instances
                .iter()
                .map(|instance| {
                    log::info!("Running benchmark on instance: {}", instance.name);
                    let results = Self::run_instance(config, instance);
                    progress.inc(1);
                    results
                })
                .collect()
        };
        progress.finish_and_clear();

        self.results.extend(per_instance.into_iter().flatten());
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut by_algorithm: BTreeMap<&str, Vec<&AlgorithmResult>> = BTreeMap::new();
        for result in &self.results {
            by_algorithm.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = by_algorithm
            .into_iter()
            .map(|(algorithm, results)| {
                let costs: Vec<f64> = results.iter().map(|r| r.cost as f64).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let gaps: Vec<f64> = results.iter().filter_map(|r| r.gap_to_best).collect();

                let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };
                let (avg_gap, worst_gap) = if gaps.is_empty() {
                    (None, None)
                } else {
                    (Some(gaps.iter().mean()), Some(gaps.iter().cloned().fold(f64::MIN, f64::max)))
                };

                AlgorithmStatistics {
                    algorithm: algorithm.to_string(),
                    num_results: results.len(),
                    num_optimal: gaps.iter().filter(|&&g| g.abs() < 1e-9).count(),
                    avg_cost: costs.iter().mean(),
                    std_cost,
                    avg_gap,
                    worst_gap,
                    avg_time: times.iter().mean(),
                }
            })
            .collect();

        statistics.sort_by(|a, b| a.avg_cost.total_cmp(&b.avg_cost));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Tour Optimizer Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Instances: {} x {} nodes ({}, {})\n\n",
            self.config.num_instances,
            self.config.size,
            if self.config.asymmetric { "asymmetric" } else { "symmetric" },
            if self.config.round_trip { "round-trip" } else { "open-path" },
        ));

        report.push_str(&"-".repeat(80));
        report.push('\n');
        report.push_str(&format!(
            "{:<34} {:>9} {:>12} {:>10} {:>10} {:>10}\n",
            "Algorithm", "Optimal", "Avg Cost", "Avg Gap%", "Max Gap%", "Avg Time"
        ));
        report.push_str(&"-".repeat(80));
        report.push('\n');

        for stat in self.compute_statistics() {
            let fmt_gap = |g: Option<f64>| g.map(|g| format!("{:.2}%", g)).unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:<34} {:>9} {:>12.1} {:>10} {:>10} {:>10.4}\n",
                stat.algorithm,
                format!("{}/{}", stat.num_optimal, stat.num_results),
                stat.avg_cost,
                fmt_gap(stat.avg_gap),
                fmt_gap(stat.worst_gap),
                stat.avg_time
            ));
        }

        report.push_str(&"-".repeat(80));
        report.push('\n');
        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_instances: 3,
            size: 6,
            solver: SolverConfig::quick(2_000, 30),
            parallel: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_instances, 20);
        assert!(config.round_trip);
    }

    #[test]
    fn test_random_instance_is_seeded() {
        let a = random_instance("a", 7, true, 9).unwrap();
        let b = random_instance("b", 7, true, 9).unwrap();
        assert_eq!(a.matrix, b.matrix);
        assert_eq!(a.dimension(), 7);
        assert!(!a.matrix.is_symmetric());
        assert!(random_instance("s", 7, false, 9).unwrap().matrix.is_symmetric());
    }

    #[test]
    fn test_no_algorithm_beats_exact() {
        let mut benchmark = Benchmark::new(small_config());
        let instances = benchmark.generate_instances().unwrap();
        benchmark.run(&instances);

        assert_eq!(benchmark.results().len(), 3 * 6);
        for result in benchmark.results() {
            let gap = result.gap_to_best.expect("exact optimum available");
            assert!(gap >= -1e-9, "{} beat the optimum on {}", result.algorithm, result.instance);
        }

        let stats = benchmark.compute_statistics();
        let exact = stats.iter().find(|s| s.algorithm == "Exact").unwrap();
        assert_eq!(exact.num_optimal, 3);
        assert!(benchmark.generate_report().contains("GuidedLocalSearch"));
    }
}
