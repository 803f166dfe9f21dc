//! Tour Optimizer - Command Line Interface
//!
//! Optimizes the visiting order of a small set of locations from a JSON request.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tour_optimizer::benchmark::{Benchmark, BenchmarkConfig};
use tour_optimizer::config::SolverConfig;
use tour_optimizer::exact::BruteForceSolver;
use tour_optimizer::instance::RoutingInstance;
use tour_optimizer::optimizer::Optimizer;
use tour_optimizer::request::OptimizationRequest;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "tour-optimizer")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Finds a low-cost visiting order over a handful of locations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a request file
    Solve {
        /// JSON request: distance_matrix, is_round_trip, optional list of locations
        #[arg(short, long)]
        input: PathBuf,

        /// JSON solver configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the search time limit in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,

        /// Override the random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output outcome to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve a request exactly by enumerating every order
    Exact {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Benchmark the heuristics on random instances
    Benchmark {
        /// Number of random instances
        #[arg(short = 'n', long, default_value = "20")]
        instances: usize,

        /// Nodes per instance, depot included
        #[arg(long, default_value = "8")]
        size: usize,

        /// Generate asymmetric matrices
        #[arg(long)]
        asymmetric: bool,

        /// Benchmark the open-path objective instead of the round trip
        #[arg(long)]
        open_path: bool,

        /// Search time limit per optimizer run in milliseconds
        #[arg(long, default_value = "1000")]
        time_limit_ms: u64,

        /// Iteration cap per optimizer run
        #[arg(long, default_value = "200")]
        max_iterations: usize,

        /// Instance generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Solve { input, config, time_limit_ms, seed, output, verbose } => {
            solve_request(&input, config, time_limit_ms, seed, output, verbose)
        }

        Commands::Exact { input } => solve_exact(&input),

        Commands::Benchmark {
            instances,
            size,
            asymmetric,
            open_path,
            time_limit_ms,
            max_iterations,
            seed,
            output,
        } => {
            let config = BenchmarkConfig {
                num_instances: instances,
                size,
                asymmetric,
                round_trip: !open_path,
                solver: SolverConfig::quick(time_limit_ms, max_iterations),
                seed,
                ..Default::default()
            };
            run_benchmark(config, &output)
        }
    }
}

fn load_request(path: &PathBuf) -> Result<OptimizationRequest> {
    let request = OptimizationRequest::from_file(path)
        .with_context(|| format!("failed to read request {:?}", path))?;
    request.validate().context("invalid request")?;
    Ok(request)
}

fn solve_request(
    path: &PathBuf,
    config_path: Option<PathBuf>,
    time_limit_ms: Option<u64>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let request = load_request(path)?;

    let mut config = match config_path {
        Some(p) => SolverConfig::from_file(&p).with_context(|| format!("failed to read config {:?}", p))?,
        None => SolverConfig::default(),
    };
    if let Some(ms) = time_limit_ms {
        config.time_limit_ms = ms;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    if verbose {
        println!("Locations: {}", request.distance_matrix.len());
        println!("Round trip: {}", request.is_round_trip);
        println!("Config: {:?}", config);
    }

    let start = Instant::now();
    let outcome = Optimizer::with_config(config).solve_request(&request)?;
    let elapsed = start.elapsed();

    println!("\n========== Results ==========");
    println!("{}", outcome);
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if let Some(names) = request.location_names(&outcome.optimized_order) {
        println!("\nRoute:");
        for (step, name) in names.iter().enumerate() {
            println!("  {}. {}", step + 1, name);
        }
        if request.is_round_trip && !names.is_empty() {
            println!("  {}. {} (return)", names.len() + 1, names[0]);
        }
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(&out_path, json).with_context(|| format!("failed to write {:?}", out_path))?;
        println!("\nOutcome saved to {:?}", out_path);
    }

    Ok(())
}

fn solve_exact(path: &PathBuf) -> Result<()> {
    let (instance, round_trip) = RoutingInstance::from_json_file(path)
        .with_context(|| format!("failed to load request {:?}", path))?;

    let result = BruteForceSolver::new().solve(&instance, round_trip)?;

    println!("\n========== Exact Results ==========");
    println!("{}", result.outcome);
    println!("Orders explored: {}", result.orders_explored);
    println!("Time: {:.4}s", result.computation_time);
    Ok(())
}

fn run_benchmark(config: BenchmarkConfig, output: &PathBuf) -> Result<()> {
    if config.num_instances == 0 {
        bail!("nothing to benchmark: --instances must be positive");
    }

    std::fs::create_dir_all(output).context("failed to create output directory")?;

    let mut benchmark = Benchmark::new(config);
    let instances = benchmark.generate_instances()?;
    println!("Generated {} instances", instances.len());

    benchmark.run(&instances);

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path).context("failed to export results")?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path).context("failed to export statistics")?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report).context("failed to save report")?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}
