//! Density-clustering overlay.
//!
//! Labels normally come from the compute backend; this module validates them,
//! derives per-cluster convex hulls for the overlay (noise excluded), and offers
//! a local DBSCAN used when the backend is unreachable.

mod local;
mod overlay;

use serde::{Deserialize, Serialize};

pub use local::dbscan;
pub use overlay::{ClusterHull, LabelSummary, cluster_hulls, summarize_labels, validate_labels};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbscanParams {
    pub epsilon: f64,
    pub min_points: usize,
}

impl Default for DbscanParams {
    fn default() -> Self {
        Self {
            epsilon: 1.2,
            min_points: 4,
        }
    }
}

impl DbscanParams {
    pub fn validate(&self) -> Result<(), DbscanError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(DbscanError::InvalidEpsilon(self.epsilon));
        }
        if self.min_points == 0 {
            return Err(DbscanError::InvalidMinPoints);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbscanError {
    #[error("Label count {labels} does not match point count {points}")]
    LabelLengthMismatch { points: usize, labels: usize },
    #[error("epsilon must be finite and positive (got {0})")]
    InvalidEpsilon(f64),
    #[error("minPoints must be greater than zero")]
    InvalidMinPoints,
}
