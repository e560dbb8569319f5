//! Linear regression by full-batch gradient descent with a recorded trajectory.

use serde::{Deserialize, Serialize};

use crate::dataset::Samples;

/// Final fit: one coefficient per feature plus the intercept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub mse: f64,
}

impl LinearFit {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(coefficient, value)| coefficient * value)
                .sum::<f64>()
    }
}

/// Per-iteration coefficients (`[intercept, c1, c2, ...]`) and MSE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearHistory {
    pub coefficients_history: Vec<Vec<f64>>,
    pub mse_history: Vec<f64>,
}

impl LinearHistory {
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients_history.len() != self.mse_history.len() {
            return Err(format!(
                "coefficients_history has {} entries but mse_history has {}",
                self.coefficients_history.len(),
                self.mse_history.len()
            ));
        }
        Ok(())
    }

    pub fn final_fit(&self) -> Option<LinearFit> {
        let (intercept, coefficients) = self.coefficients_history.last()?.split_first()?;
        Some(LinearFit {
            coefficients: coefficients.to_vec(),
            intercept: *intercept,
            mse: self.mse_history.last().copied().unwrap_or_default(),
        })
    }
}

pub fn mse(fit: &LinearFit, samples: &Samples) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples
        .x
        .iter()
        .zip(&samples.y)
        .map(|(row, y)| {
            let residual = fit.predict(row) - y;
            residual * residual
        })
        .sum();
    total / samples.len() as f64
}

/// Gradient descent from zero; entry `i` is the state after `i + 1` updates.
pub fn train_history(
    samples: &Samples,
    learning_rate: f64,
    iterations: usize,
) -> Result<LinearHistory, String> {
    if samples.x.len() != samples.y.len() {
        return Err("Mismatched X/y lengths".to_string());
    }
    if samples.is_empty() {
        return Err("Empty training set".to_string());
    }
    let dim = samples.x[0].len();
    if samples.x.iter().any(|row| row.len() != dim) {
        return Err("Inconsistent feature row length".to_string());
    }
    let rows = samples.len() as f64;
    let mut fit = LinearFit {
        coefficients: vec![0.0; dim],
        intercept: 0.0,
        mse: 0.0,
    };
    let mut history = LinearHistory::default();
    for _ in 0..iterations {
        let mut grad_intercept = 0.0;
        let mut grad = vec![0.0f64; dim];
        for (row, y) in samples.x.iter().zip(&samples.y) {
            let residual = fit.predict(row) - y;
            grad_intercept += residual;
            for (slot, value) in grad.iter_mut().zip(row) {
                *slot += residual * value;
            }
        }
        fit.intercept -= learning_rate * 2.0 * grad_intercept / rows;
        for (coefficient, g) in fit.coefficients.iter_mut().zip(&grad) {
            *coefficient -= learning_rate * 2.0 * g / rows;
        }
        let mut snapshot = Vec::with_capacity(dim + 1);
        snapshot.push(fit.intercept);
        snapshot.extend_from_slice(&fit.coefficients);
        history.coefficients_history.push(snapshot);
        history.mse_history.push(mse(&fit, samples));
    }
    Ok(history)
}

/// Run the descent to completion and return only the final fit.
pub fn fit(samples: &Samples, learning_rate: f64, iterations: usize) -> Result<LinearFit, String> {
    let history = train_history(samples, learning_rate, iterations)?;
    match history.final_fit() {
        Some(fit) => Ok(fit),
        None => {
            let dim = samples.x.first().map(Vec::len).unwrap_or(0);
            let zero = LinearFit {
                coefficients: vec![0.0; dim],
                intercept: 0.0,
                mse: 0.0,
            };
            let mse = mse(&zero, samples);
            Ok(LinearFit { mse, ..zero })
        }
    }
}
