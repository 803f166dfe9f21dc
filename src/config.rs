//! Solver configuration.
//!
//! Defaults reproduce the engine's fixed behaviour (5 second budget, guided local search).
//! A JSON file may override any subset of fields.

use crate::error::Result;
use crate::termination::TimeBudget;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Parameters of one optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock budget for the search phase, in milliseconds
    pub time_limit_ms: u64,
    /// Penalty weight as a fraction of the average arc cost of the first local optimum
    pub lambda_coefficient: f64,
    /// Escalation rounds without a new best before penalties are reset
    pub reset_after: usize,
    /// Segment reversals applied when restarting from the best tour
    pub kick_strength: usize,
    /// Optional cap on escalation rounds
    pub max_iterations: Option<usize>,
    /// Random seed
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit_ms: 5_000,
            lambda_coefficient: 0.1,
            reset_after: 50,
            kick_strength: 2,
            max_iterations: None,
            seed: 42,
        }
    }
}

impl SolverConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn time_budget(&self) -> TimeBudget {
        TimeBudget::new(Duration::from_millis(self.time_limit_ms))
    }

    /// Short budget with an iteration cap, for tests and benchmarks.
    pub fn quick(time_limit_ms: u64, max_iterations: usize) -> Self {
        SolverConfig {
            time_limit_ms,
            max_iterations: Some(max_iterations),
            ..Default::default()
        }
    }
}
