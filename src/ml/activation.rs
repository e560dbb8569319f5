//! Activation functions.

use serde::{Deserialize, Serialize};

pub fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}

pub fn relu(value: f64) -> f64 {
    value.max(0.0)
}

/// Numerically stable softmax; a zero denominator yields a uniform distribution.
pub fn softmax(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = raw.iter().map(|value| (value - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / raw.len() as f64; raw.len()];
    }
    exps.into_iter().map(|value| value / sum).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Sigmoid,
    Relu,
    Tanh,
    Linear,
}

impl Activation {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(value),
            Activation::Relu => relu(value),
            Activation::Tanh => value.tanh(),
            Activation::Linear => value,
        }
    }

    /// Derivative expressed in terms of the activation output.
    pub fn derivative_from_output(self, output: f64) -> f64 {
        match self {
            Activation::Sigmoid => output * (1.0 - output),
            Activation::Relu => {
                if output > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => 1.0 - output * output,
            Activation::Linear => 1.0,
        }
    }
}
