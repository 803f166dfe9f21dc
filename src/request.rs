//! Request schema and caller-side validation.
//!
//! The engine assumes a well-formed square matrix; these checks run before it is invoked.

use crate::error::{OptimizeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Fewest locations a request may carry.
pub const MIN_LOCATIONS: usize = 2;
/// Most locations a request may carry.
pub const MAX_LOCATIONS: usize = 10;

fn default_round_trip() -> bool {
    true
}

/// A stop as described by the caller. Only the count and the names are used here; the
/// coordinates were already turned into `distance_matrix` upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

/// A route optimization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Stops in matrix order. May be omitted, in which case the matrix alone defines them.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Directed arc costs in meters
    pub distance_matrix: Vec<Vec<u64>>,
    /// Return to the starting point
    #[serde(default = "default_round_trip")]
    pub is_round_trip: bool,
}

impl OptimizationRequest {
    pub fn new(distance_matrix: Vec<Vec<u64>>, is_round_trip: bool) -> Self {
        OptimizationRequest {
            locations: Vec::new(),
            distance_matrix,
            is_round_trip,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of the stops in `order`, or `None` when the request carries no locations.
    pub fn location_names(&self, order: &[usize]) -> Option<Vec<&str>> {
        if self.locations.is_empty() {
            return None;
        }
        order
            .iter()
            .map(|&i| self.locations.get(i).map(|l| l.name.as_str()))
            .collect()
    }

    /// Rejects requests the engine must never see.
    pub fn validate(&self) -> Result<()> {
        let size = self.distance_matrix.len();
        let locations = if self.locations.is_empty() {
            size
        } else {
            self.locations.len()
        };

        if locations < MIN_LOCATIONS {
            return Err(OptimizeError::TooFewLocations {
                min: MIN_LOCATIONS,
                found: locations,
            });
        }
        if locations > MAX_LOCATIONS {
            return Err(OptimizeError::TooManyLocations {
                max: MAX_LOCATIONS,
                found: locations,
            });
        }
        if size != locations {
            return Err(OptimizeError::DimensionMismatch {
                matrix: size,
                locations,
            });
        }

        for (row, values) in self.distance_matrix.iter().enumerate() {
            if values.len() != size {
                return Err(OptimizeError::MalformedMatrix {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }
}
