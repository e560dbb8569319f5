use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::backend::api::{ForestParams, TreeParams};
use crate::clustering::dbscan::DbscanParams;
use crate::clustering::kmeans::{InitPolicy, KMeansParams};
use crate::clustering::som::SomParams;
use crate::dataset::DEFAULT_NOISE_RATIO;
use crate::geometry::{Bounds, Point};
use crate::ml::activation::Activation;
use crate::ml::impurity::Criterion;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const MIN_CANVAS_SIDE: u32 = 16;
const MAX_CANVAS_SIDE: u32 = 4096;

/// Everything the gallery reads from `config.toml`.
///
/// Config keys (TOML): `api_url`, `offline`, `output_dir`, `canvas`, `kmeans`,
/// `som`, `dbscan`, `knn`, `regression`, `trees`, `network`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub api_url: String,
    /// Skip the backend entirely and use local fallbacks.
    pub offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub canvas: CanvasSettings,
    pub kmeans: KMeansSettings,
    pub som: SomSettings,
    pub dbscan: DbscanSettings,
    pub knn: KnnSettings,
    pub regression: RegressionSettings,
    pub trees: TreeSettings,
    pub network: NetworkSettings,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            offline: false,
            output_dir: None,
            canvas: CanvasSettings::default(),
            kmeans: KMeansSettings::default(),
            som: SomSettings::default(),
            dbscan: DbscanSettings::default(),
            knn: KnnSettings::default(),
            regression: RegressionSettings::default(),
            trees: TreeSettings::default(),
            network: NetworkSettings::default(),
        }
    }
}

impl GallerySettings {
    /// Clamp every knob into a usable range.
    pub fn normalized(self) -> Self {
        let api_url = match crate::backend::parse_api_url(&self.api_url) {
            Ok(url) => url.as_str().trim_end_matches('/').to_string(),
            Err(err) => {
                tracing::warn!("{err}; using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            }
        };
        Self {
            api_url,
            offline: self.offline,
            output_dir: self.output_dir.filter(|dir| !dir.as_os_str().is_empty()),
            canvas: self.canvas.normalized(),
            kmeans: self.kmeans.normalized(),
            som: self.som.normalized(),
            dbscan: self.dbscan.normalized(),
            knn: self.knn.normalized(),
            regression: self.regression.normalized(),
            trees: self.trees.normalized(),
            network: self.network.normalized(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    /// Upper bound on frames written by any page.
    pub max_frames: usize,
    /// Visible world rectangle.
    pub world: Bounds,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            max_frames: 60,
            world: Bounds::default(),
        }
    }
}

impl CanvasSettings {
    fn normalized(self) -> Self {
        Self {
            width: self.width.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE),
            height: self.height.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE),
            max_frames: self.max_frames.max(1),
            world: if self.world.is_valid() && self.world.width() > 0.0 && self.world.height() > 0.0
            {
                self.world
            } else {
                Bounds::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansSettings {
    /// Blobs the synthetic points are drawn around.
    pub blobs: usize,
    pub points_per_blob: usize,
    pub spread: f64,
    pub k: usize,
    pub iterations: usize,
    pub init: InitPolicy,
    pub seed: u64,
}

impl Default for KMeansSettings {
    fn default() -> Self {
        let params = KMeansParams::default();
        Self {
            blobs: 3,
            points_per_blob: 50,
            spread: 1.5,
            k: params.k,
            iterations: params.iterations,
            init: params.init,
            seed: params.seed,
        }
    }
}

impl KMeansSettings {
    fn normalized(self) -> Self {
        Self {
            blobs: self.blobs.clamp(1, 12),
            points_per_blob: self.points_per_blob.clamp(1, 1000),
            spread: finite_or(self.spread, 1.5).max(0.0),
            k: self.k.clamp(1, 15),
            ..self
        }
    }

    pub fn params(&self, bounds: Bounds) -> KMeansParams {
        KMeansParams {
            k: self.k,
            iterations: self.iterations,
            init: self.init,
            bounds,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SomSettings {
    pub point_count: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub max_iterations: usize,
    pub learning_rate: f64,
    pub radius: f64,
    /// Iterations between two rendered frames.
    pub steps_per_frame: usize,
    pub seed: u64,
}

impl Default for SomSettings {
    fn default() -> Self {
        let params = SomParams::default();
        Self {
            point_count: 300,
            grid_width: params.grid_width,
            grid_height: params.grid_height,
            max_iterations: params.max_iterations,
            learning_rate: params.initial_learning_rate,
            radius: params.initial_radius,
            steps_per_frame: 10,
            seed: params.seed,
        }
    }
}

impl SomSettings {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            grid_width: self.grid_width.clamp(1, 50),
            grid_height: self.grid_height.clamp(1, 50),
            learning_rate: positive_or(self.learning_rate, defaults.learning_rate),
            radius: positive_or(self.radius, defaults.radius),
            steps_per_frame: self.steps_per_frame.max(1),
            ..self
        }
    }

    pub fn params(&self) -> SomParams {
        SomParams {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            max_iterations: self.max_iterations,
            initial_learning_rate: self.learning_rate,
            initial_radius: self.radius,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbscanSettings {
    pub clusters: usize,
    pub points_per_cluster: usize,
    pub spread: f64,
    /// Share of all points that are uniform noise.
    pub noise_ratio: f64,
    pub epsilon: f64,
    pub min_points: usize,
    pub seed: u64,
}

impl Default for DbscanSettings {
    fn default() -> Self {
        let params = DbscanParams::default();
        Self {
            clusters: 3,
            points_per_cluster: 40,
            spread: 0.8,
            noise_ratio: DEFAULT_NOISE_RATIO,
            epsilon: params.epsilon,
            min_points: params.min_points,
            seed: 7,
        }
    }
}

impl DbscanSettings {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            clusters: self.clusters.clamp(1, 10),
            spread: finite_or(self.spread, defaults.spread).max(0.0),
            noise_ratio: finite_or(self.noise_ratio, defaults.noise_ratio).clamp(0.0, 0.9),
            epsilon: positive_or(self.epsilon, defaults.epsilon),
            min_points: self.min_points.max(1),
            ..self
        }
    }

    pub fn params(&self) -> DbscanParams {
        DbscanParams {
            epsilon: self.epsilon,
            min_points: self.min_points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnSettings {
    pub k: usize,
    pub classes: usize,
    pub points_per_class: usize,
    pub spread: f64,
    /// Point whose neighbours are highlighted.
    pub query: Point,
    pub seed: u64,
}

impl Default for KnnSettings {
    fn default() -> Self {
        Self {
            k: 5,
            classes: 3,
            points_per_class: 30,
            spread: 2.5,
            query: Point::new(0.0, 0.0),
            seed: 11,
        }
    }
}

impl KnnSettings {
    fn normalized(self) -> Self {
        Self {
            k: self.k.clamp(1, 25),
            classes: self.classes.clamp(1, 10),
            spread: finite_or(self.spread, 2.5).max(0.0),
            query: if self.query.is_finite() {
                self.query
            } else {
                Point::default()
            },
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionSettings {
    pub samples: usize,
    pub learning_rate: f64,
    pub iterations: usize,
    /// Gaussian noise added to the synthetic linear targets.
    pub noise: f64,
    pub slope: f64,
    pub intercept: f64,
    /// Fetch the logistic data set from the backend instead of generating it.
    pub fetch_logistic_data: bool,
    pub seed: u64,
}

impl Default for RegressionSettings {
    fn default() -> Self {
        Self {
            samples: 80,
            learning_rate: 0.1,
            iterations: 100,
            noise: 1.5,
            slope: 0.6,
            intercept: 2.0,
            fetch_logistic_data: false,
            seed: 3,
        }
    }
}

impl RegressionSettings {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            samples: self.samples.clamp(2, 5000),
            learning_rate: positive_or(self.learning_rate, defaults.learning_rate),
            iterations: self.iterations.max(1),
            noise: finite_or(self.noise, defaults.noise).max(0.0),
            slope: finite_or(self.slope, defaults.slope),
            intercept: finite_or(self.intercept, defaults.intercept),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    pub dataset: String,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub criterion: Criterion,
    pub n_trees: usize,
    pub subsample_ratio: f64,
    pub feature_subset: String,
    /// Feature vector sent to `predict_forest`; empty skips the prediction.
    pub record: Vec<f64>,
}

impl Default for TreeSettings {
    fn default() -> Self {
        let tree = TreeParams::default();
        let forest = ForestParams::default();
        Self {
            dataset: "iris".to_string(),
            max_depth: tree.max_depth,
            min_samples_split: tree.min_samples_split,
            criterion: tree.criterion,
            n_trees: forest.n_trees,
            subsample_ratio: forest.subsample_ratio,
            feature_subset: forest.feature_subset,
            record: vec![5.1, 3.5, 1.4, 0.2],
        }
    }
}

impl TreeSettings {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        let dataset = self.dataset.trim().to_string();
        Self {
            dataset: if dataset.is_empty() { defaults.dataset } else { dataset },
            max_depth: self.max_depth.clamp(1, 20),
            min_samples_split: self.min_samples_split.max(2),
            n_trees: self.n_trees.clamp(1, 100),
            subsample_ratio: finite_or(self.subsample_ratio, defaults.subsample_ratio)
                .clamp(0.05, 1.0),
            record: self.record.into_iter().filter(|v| v.is_finite()).collect(),
            ..self
        }
    }

    pub fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            criterion: self.criterion,
        }
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            subsample_ratio: self.subsample_ratio,
            feature_subset: self.feature_subset.clone(),
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            criterion: self.criterion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Input size first, output size last.
    pub layer_sizes: Vec<usize>,
    pub activation: Activation,
    pub learning_rate: f64,
    /// Training epochs over the XOR table.
    pub epochs: usize,
    pub seed: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            layer_sizes: vec![2, 4, 1],
            activation: Activation::Sigmoid,
            learning_rate: 0.5,
            epochs: 2000,
            seed: 1,
        }
    }
}

impl NetworkSettings {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        let usable = self.layer_sizes.len() >= 2
            && !self.layer_sizes.contains(&0)
            && self.layer_sizes.first() == Some(&2)
            && self.layer_sizes.last() == Some(&1);
        Self {
            layer_sizes: if usable {
                self.layer_sizes
            } else {
                defaults.layer_sizes
            },
            learning_rate: positive_or(self.learning_rate, defaults.learning_rate),
            epochs: self.epochs.max(1),
            ..self
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
