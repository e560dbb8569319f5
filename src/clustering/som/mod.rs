//! Self-organizing map relaxation over 2D inputs.
//!
//! Nodes live on a `grid_width x grid_height` lattice. Each step draws one input,
//! finds its best matching unit (BMU), and pulls every node toward the input by
//! a Gaussian of its lattice distance to the BMU. Learning rate and radius decay
//! exponentially with the iteration index. State persists between frames.

mod train;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

pub use train::{SomSimulation, find_bmu, influence};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SomParams {
    pub grid_width: usize,
    pub grid_height: usize,
    pub max_iterations: usize,
    pub initial_learning_rate: f64,
    pub initial_radius: f64,
    pub seed: u64,
}

impl Default for SomParams {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 10,
            max_iterations: 500,
            initial_learning_rate: 0.5,
            initial_radius: 5.0,
            seed: 42,
        }
    }
}

impl SomParams {
    pub fn validate(&self) -> Result<(), SomError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SomError::EmptyGrid);
        }
        if !self.initial_learning_rate.is_finite() || self.initial_learning_rate <= 0.0 {
            return Err(SomError::InvalidLearningRate(self.initial_learning_rate));
        }
        if !self.initial_radius.is_finite() || self.initial_radius <= 0.0 {
            return Err(SomError::InvalidRadius(self.initial_radius));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SomError {
    #[error("SOM grid must have at least one node")]
    EmptyGrid,
    #[error("Learning rate must be finite and positive (got {0})")]
    InvalidLearningRate(f64),
    #[error("Neighbourhood radius must be finite and positive (got {0})")]
    InvalidRadius(f64),
    #[error("Sampling bounds are invalid: {0:?}")]
    InvalidBounds(Bounds),
}

/// Exponential decay of learning rate and neighbourhood radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecaySchedule {
    pub initial_learning_rate: f64,
    pub initial_radius: f64,
    pub max_iterations: usize,
    time_constant: f64,
}

impl DecaySchedule {
    pub fn new(params: &SomParams) -> Self {
        let iterations = params.max_iterations.max(1) as f64;
        let time_constant = if params.initial_radius > 1.0 {
            iterations / params.initial_radius.ln()
        } else {
            iterations
        };
        Self {
            initial_learning_rate: params.initial_learning_rate,
            initial_radius: params.initial_radius,
            max_iterations: params.max_iterations,
            time_constant,
        }
    }

    pub fn radius(&self, iteration: usize) -> f64 {
        self.initial_radius * (-(iteration as f64) / self.time_constant).exp()
    }

    pub fn learning_rate(&self, iteration: usize) -> f64 {
        let iterations = self.max_iterations.max(1) as f64;
        self.initial_learning_rate * (-(iteration as f64) / iterations).exp()
    }
}

/// Node positions in row-major lattice order plus the iteration counter.
#[derive(Debug, Clone, PartialEq)]
pub struct SomState {
    pub nodes: Vec<Point>,
    pub grid_width: usize,
    pub grid_height: usize,
    pub iteration: usize,
    pub schedule: DecaySchedule,
}

impl SomState {
    /// Scatter nodes uniformly inside `bounds`.
    pub fn initialize<R: Rng + ?Sized>(
        params: &SomParams,
        bounds: Bounds,
        rng: &mut R,
    ) -> Result<Self, SomError> {
        params.validate()?;
        if !bounds.is_valid() {
            return Err(SomError::InvalidBounds(bounds));
        }
        let count = params.grid_width * params.grid_height;
        Ok(Self {
            nodes: (0..count).map(|_| bounds.sample(rng)).collect(),
            grid_width: params.grid_width,
            grid_height: params.grid_height,
            iteration: 0,
            schedule: DecaySchedule::new(params),
        })
    }

    /// `(column, row)` of a node index.
    pub fn lattice_position(&self, index: usize) -> (usize, usize) {
        (index % self.grid_width, index / self.grid_width)
    }

    pub fn lattice_distance(&self, a: usize, b: usize) -> f64 {
        let (ax, ay) = self.lattice_position(a);
        let (bx, by) = self.lattice_position(b);
        let dx = ax as f64 - bx as f64;
        let dy = ay as f64 - by as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn node(&self, column: usize, row: usize) -> Option<Point> {
        if column >= self.grid_width || row >= self.grid_height {
            return None;
        }
        self.nodes.get(row * self.grid_width + column).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.iteration >= self.schedule.max_iterations
    }

    /// One competitive-learning iteration on a random input.
    ///
    /// Returns `false` without changing anything once the iteration cap is
    /// reached or when there are no inputs.
    pub fn step<R: Rng + ?Sized>(&mut self, points: &[Point], rng: &mut R) -> bool {
        if self.is_finished() || points.is_empty() {
            return false;
        }
        let input = points[rng.random_range(0..points.len())];
        train::relax_toward(self, input);
        self.iteration += 1;
        true
    }

    /// Step forward until `iteration` (clamped to the cap). Never replays from zero.
    pub fn advance_to<R: Rng + ?Sized>(&mut self, iteration: usize, points: &[Point], rng: &mut R) {
        while self.iteration < iteration && self.step(points, rng) {}
    }
}
