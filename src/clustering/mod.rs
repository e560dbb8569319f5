//! Self-hosted clustering simulations: K-Means, the DBSCAN overlay, and SOM relaxation.

pub mod dbscan;
pub mod kmeans;
pub mod som;

/// Cluster label as produced by the density-clustering backend.
pub type Label = i32;

/// Sentinel label for points outside every cluster.
pub const NOISE_LABEL: Label = -1;
