//! Machine-learning visualization gallery: clustering simulations, classifier
//! decision regions and backend-driven tree pages rendered to PNG frames.

/// Parameter controls, scenes and the frame loop.
pub mod animation;
/// Application directory resolution.
pub mod app_dirs;
/// Client for the external compute backend.
pub mod backend;
/// K-Means, DBSCAN overlay and SOM.
pub mod clustering;
/// TOML settings.
pub mod config;
/// Synthetic sample generators.
pub mod dataset;
/// Page runners.
pub mod gallery;
/// Points, bounds and convex hulls.
pub mod geometry;
pub(crate) mod http_client;
/// Log file and stdout tracing setup.
pub mod logging;
/// Small self-contained learners and metrics.
pub mod ml;
/// Raster canvas and painters.
pub mod render;
