//! Binary logistic regression with a recorded training trajectory.
//!
//! Weight vectors carry the intercept at index 0 followed by one weight per
//! feature, matching the layout returned by the backend's history endpoint.

use serde::{Deserialize, Serialize};

use crate::ml::activation::sigmoid;

mod train;
pub use train::{TrainOptions, train_history};

/// Trained weights (`[intercept, w1, w2, ...]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    pub weights: Vec<f64>,
}

impl LogRegModel {
    /// Probability of the positive class; missing features count as zero.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        let Some((intercept, weights)) = self.weights.split_first() else {
            return 0.5;
        };
        let logit = intercept
            + weights
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        sigmoid(logit)
    }

    pub fn predict_class(&self, features: &[f64]) -> u8 {
        u8::from(self.predict_proba(features) >= 0.5)
    }

    /// `(slope, intercept)` of the 2D boundary `w0 + w1*x + w2*y = 0`.
    pub fn decision_line(&self) -> Option<(f64, f64)> {
        let [w0, w1, w2] = self.weights.as_slice() else {
            return None;
        };
        if w2.abs() < f64::EPSILON {
            return None;
        }
        Some((-w1 / w2, -w0 / w2))
    }
}

/// Per-iteration weights and loss, plus the final predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogisticHistory {
    pub weights_history: Vec<Vec<f64>>,
    pub loss_history: Vec<f64>,
    /// Predicted class (0 or 1) per training row under the final weights.
    pub final_predictions: Vec<f64>,
    pub final_loss: f64,
}

impl LogisticHistory {
    pub fn validate(&self, rows: usize) -> Result<(), String> {
        if self.weights_history.len() != self.loss_history.len() {
            return Err(format!(
                "weights_history has {} entries but loss_history has {}",
                self.weights_history.len(),
                self.loss_history.len()
            ));
        }
        if self.final_predictions.len() != rows {
            return Err(format!(
                "final_predictions has {} entries for {rows} rows",
                self.final_predictions.len()
            ));
        }
        Ok(())
    }

    pub fn final_model(&self) -> Option<LogRegModel> {
        self.weights_history.last().map(|weights| LogRegModel {
            weights: weights.clone(),
        })
    }
}

/// Mean binary cross-entropy with probabilities clamped away from 0 and 1.
pub fn log_loss(probabilities: &[f64], targets: &[f64]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    const EPS: f64 = 1e-12;
    let total: f64 = probabilities
        .iter()
        .zip(targets)
        .map(|(p, y)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / probabilities.len() as f64
}
