//! Seeded synthetic sample generators for the gallery pages.
//!
//! Every generator takes the RNG by reference so a page can reproduce the same
//! sample set from its configured seed.

mod blobs;
mod regression;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

pub use blobs::{blob_centers, dbscan_demo, gaussian_blob, labeled_blobs};
pub use regression::{binary_classes, linear_samples};

/// Default share of noise points in the DBSCAN demo set.
pub const DEFAULT_NOISE_RATIO: f64 = 0.1;

/// A 2D sample carrying its class index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub point: Point,
    pub label: usize,
}

/// Feature matrix plus targets, shaped like the regression endpoints expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Samples {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Spread must be finite and non-negative (got {0})")]
    InvalidSpread(f64),
    #[error("Noise ratio must be within [0, 0.9] (got {0})")]
    InvalidNoiseRatio(f64),
    #[error("Sampling bounds are invalid: {0:?}")]
    InvalidBounds(Bounds),
}

/// Uniform scatter inside `bounds`.
pub fn uniform<R: Rng + ?Sized>(count: usize, bounds: Bounds, rng: &mut R) -> Vec<Point> {
    (0..count).map(|_| bounds.sample(rng)).collect()
}
