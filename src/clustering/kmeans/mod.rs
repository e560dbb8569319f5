//! K-Means simulation with persisted state and an explicit step function.
//!
//! A run never checks for convergence: it always performs the configured number
//! of assign/update steps. Frame-by-frame rendering advances a
//! [`KMeansSimulation`] instead of replaying the run from iteration zero.

mod init;
mod step;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

pub use init::initial_centroids;
pub use step::{assign, nearest, update_centroids};

/// Centroid initialization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Each centroid drawn uniformly inside the sampling bounds.
    Random,
    /// Distance-weighted sequential sampling from the data points.
    #[default]
    PlusPlus,
}

impl InitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            InitPolicy::Random => "random",
            InitPolicy::PlusPlus => "plus_plus",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" | "uniform" => Some(InitPolicy::Random),
            "plus_plus" | "plusplus" | "kmeans++" | "++" => Some(InitPolicy::PlusPlus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    pub k: usize,
    pub iterations: usize,
    pub init: InitPolicy,
    /// Region used for random initialization and empty-cluster resets.
    pub bounds: Bounds,
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            k: 3,
            iterations: 10,
            init: InitPolicy::default(),
            bounds: Bounds::default(),
            seed: 42,
        }
    }
}

impl KMeansParams {
    pub fn validate(&self) -> Result<(), KMeansError> {
        if self.k == 0 {
            return Err(KMeansError::InvalidK);
        }
        if !self.bounds.is_valid() {
            return Err(KMeansError::InvalidBounds(self.bounds));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KMeansError {
    #[error("k must be greater than zero")]
    InvalidK,
    #[error("Sampling bounds are invalid: {0:?}")]
    InvalidBounds(Bounds),
}

/// Centroids plus the assignment each was last computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansState {
    pub centroids: Vec<Point>,
    /// Index into `centroids` per input point, as used by the latest update.
    pub assignments: Vec<usize>,
    pub iteration: usize,
}

impl KMeansState {
    pub fn initialize<R: Rng + ?Sized>(
        points: &[Point],
        params: &KMeansParams,
        rng: &mut R,
    ) -> Result<Self, KMeansError> {
        params.validate()?;
        let centroids = initial_centroids(points, params.k, params.init, params.bounds, rng);
        Ok(Self::from_centroids(points, centroids))
    }

    /// Start from caller-provided centroids.
    pub fn from_centroids(points: &[Point], centroids: Vec<Point>) -> Self {
        let assignments = assign(points, &centroids);
        Self {
            centroids,
            assignments,
            iteration: 0,
        }
    }

    /// One assign + update round.
    pub fn step<R: Rng + ?Sized>(&mut self, points: &[Point], bounds: Bounds, rng: &mut R) {
        self.assignments = assign(points, &self.centroids);
        self.centroids =
            update_centroids(points, &self.assignments, self.centroids.len(), bounds, rng);
        self.iteration += 1;
    }

    /// Sum of squared distances from each point to its assigned centroid.
    pub fn inertia(&self, points: &[Point]) -> f64 {
        points
            .iter()
            .zip(&self.assignments)
            .filter_map(|(point, &cluster)| {
                self.centroids
                    .get(cluster)
                    .map(|centroid| point.distance_squared(*centroid))
            })
            .sum()
    }
}

/// Run the full iteration budget and return the final state.
pub fn simulate(points: &[Point], params: &KMeansParams) -> Result<KMeansState, KMeansError> {
    let mut simulation = KMeansSimulation::new(points.to_vec(), *params)?;
    while simulation.step() {}
    Ok(simulation.into_state())
}

/// K-Means run that owns its points and RNG so it can be advanced one frame at a time.
#[derive(Debug, Clone)]
pub struct KMeansSimulation {
    params: KMeansParams,
    points: Vec<Point>,
    state: KMeansState,
    rng: StdRng,
}

impl KMeansSimulation {
    pub fn new(points: Vec<Point>, params: KMeansParams) -> Result<Self, KMeansError> {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let state = KMeansState::initialize(&points, &params, &mut rng)?;
        Ok(Self {
            params,
            points,
            state,
            rng,
        })
    }

    /// Advance one iteration; returns `false` once the budget is spent.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.state.step(&self.points, self.params.bounds, &mut self.rng);
        tracing::trace!(
            iteration = self.state.iteration,
            inertia = self.state.inertia(&self.points),
            "k-means step"
        );
        true
    }

    pub fn is_finished(&self) -> bool {
        self.state.iteration >= self.params.iterations
    }

    pub fn params(&self) -> &KMeansParams {
        &self.params
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn state(&self) -> &KMeansState {
        &self.state
    }

    pub fn into_state(self) -> KMeansState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangles() -> Vec<Point> {
        let mut points = Vec::new();
        for center in [Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(-10.0, 10.0)] {
            points.push(Point::new(center.x - 0.5, center.y - 0.5));
            points.push(Point::new(center.x + 0.5, center.y - 0.5));
            points.push(Point::new(center.x, center.y + 0.5));
        }
        points
    }

    #[test]
    fn zero_k_is_rejected() {
        let params = KMeansParams {
            k: 0,
            ..KMeansParams::default()
        };
        assert_eq!(simulate(&triangles(), &params).unwrap_err(), KMeansError::InvalidK);
    }

    #[test]
    fn simulate_runs_exact_iteration_budget() {
        let params = KMeansParams {
            iterations: 7,
            ..KMeansParams::default()
        };
        let state = simulate(&triangles(), &params).unwrap();
        assert_eq!(state.iteration, 7);
        assert_eq!(state.centroids.len(), 3);
        assert_eq!(state.assignments.len(), 9);
    }

    #[test]
    fn simulation_stops_after_budget() {
        let params = KMeansParams {
            iterations: 2,
            ..KMeansParams::default()
        };
        let mut simulation = KMeansSimulation::new(triangles(), params).unwrap();
        assert!(simulation.step());
        assert!(simulation.step());
        assert!(!simulation.step());
        assert_eq!(simulation.state().iteration, 2);
    }

    #[test]
    fn random_policy_never_produces_nan_centroids() {
        let params = KMeansParams {
            k: 8,
            iterations: 5,
            init: InitPolicy::Random,
            bounds: Bounds::new(-20.0, 20.0, -5.0, 25.0),
            seed: 3,
        };
        let state = simulate(&triangles(), &params).unwrap();
        for centroid in &state.centroids {
            assert!(centroid.is_finite());
        }
    }

    #[test]
    fn from_centroids_converges_on_triangles() {
        let points = triangles();
        let mut state = KMeansState::from_centroids(
            &points,
            vec![Point::new(1.0, 1.0), Point::new(8.0, 8.0), Point::new(-8.0, 8.0)],
        );
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..3 {
            state.step(&points, Bounds::default(), &mut rng);
        }
        assert!((state.centroids[0].x - 0.0).abs() < 1e-9);
        assert!((state.centroids[0].y - (-1.0 / 6.0)).abs() < 1e-9);
        assert!(state.inertia(&points) < 3.0);
    }

    #[test]
    fn init_policy_parses_aliases() {
        assert_eq!(InitPolicy::parse("kmeans++"), Some(InitPolicy::PlusPlus));
        assert_eq!(InitPolicy::parse("Random"), Some(InitPolicy::Random));
        assert_eq!(InitPolicy::parse("other"), None);
    }
}
