//! Error types for the tour optimizer.
//!
//! `OptimizeError` covers everything a caller can get wrong before the engine runs
//! (bad matrices, location counts, unreadable files). `SearchError` is internal to the
//! engine: it is recovered by the optimizer's identity fallback and never reaches callers.

use thiserror::Error;

/// Caller-facing errors, raised while loading or validating input.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("distance matrix row {row} has {found} entries, expected {expected}")]
    MalformedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("arc {from} -> {to} costs {cost}, more than the maximum of {max}")]
    ArcCostOutOfRange {
        from: usize,
        to: usize,
        cost: u64,
        max: u64,
    },

    #[error("distance matrix size ({matrix}) doesn't match locations ({locations})")]
    DimensionMismatch { matrix: usize, locations: usize },

    #[error("at least {min} locations required, got {found}")]
    TooFewLocations { min: usize, found: usize },

    #[error("maximum {max} locations allowed, got {found}")]
    TooManyLocations { max: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the search phase itself, as opposed to running out of time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("construction produced {visited} of {expected} nodes")]
    NoFeasibleTour { visited: usize, expected: usize },

    #[error("search backend failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
