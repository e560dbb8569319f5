//! Supervised-learning helpers shown on the gallery pages.
//!
//! These mirror what the compute backend does so pages still have something to
//! draw when it is offline, and provide the formulas evaluated for display.

pub mod activation;
pub mod impurity;
pub mod knn;
pub mod linreg;
pub mod logreg;
pub mod metrics;
pub mod mlp;
pub mod perceptron;
