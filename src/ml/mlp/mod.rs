//! Dense feed-forward network used by the perceptron/MLP page.
//!
//! Layers exchange the same weight/bias matrices as the backend's network
//! endpoints, so a locally initialized network can be handed to the backend
//! and a backend-trained one can be evaluated locally.

mod model;
mod train;

pub use model::{DenseLayer, ForwardTrace, Network, NetworkError};
pub use train::{TrainStep, train_step};
