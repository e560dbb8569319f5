use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ml::activation::Activation;

/// One fully connected layer. `weights[o][i]` connects input `i` to output `o`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn inputs(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    pub fn outputs(&self) -> usize {
        self.biases.len()
    }

    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum = bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
                self.activation.apply(sum)
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NetworkError {
    #[error("A network needs at least an input and an output layer")]
    TooFewLayers,
    #[error("Layer sizes must be non-zero")]
    EmptyLayer,
    #[error("Layer {layer} expects {expected} inputs but receives {actual}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Layer {layer} has {rows} weight rows for {biases} biases")]
    BiasMismatch {
        layer: usize,
        rows: usize,
        biases: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<DenseLayer>,
}

/// Activations per layer, input first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardTrace {
    pub activations: Vec<Vec<f64>>,
}

impl ForwardTrace {
    pub fn output(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Network {
    /// Uniform `[-1, 1)` weights and zero biases for the given layer sizes.
    pub fn initialize<R: Rng + ?Sized>(
        sizes: &[usize],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        if sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers);
        }
        if sizes.contains(&0) {
            return Err(NetworkError::EmptyLayer);
        }
        let layers = sizes
            .windows(2)
            .map(|pair| DenseLayer {
                weights: (0..pair[1])
                    .map(|_| (0..pair[0]).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect())
                    .collect(),
                biases: vec![0.0; pair[1]],
                activation,
            })
            .collect();
        Ok(Self { layers })
    }

    /// Check that every layer's inputs match the previous layer's outputs.
    pub fn validate(&self, input_len: usize) -> Result<(), NetworkError> {
        let mut expected = input_len;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.weights.len() != layer.biases.len() {
                return Err(NetworkError::BiasMismatch {
                    layer: idx,
                    rows: layer.weights.len(),
                    biases: layer.biases.len(),
                });
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != expected) {
                return Err(NetworkError::ShapeMismatch {
                    layer: idx,
                    expected: row.len(),
                    actual: expected,
                });
            }
            expected = layer.outputs();
        }
        Ok(())
    }

    pub fn forward(&self, input: &[f64]) -> ForwardTrace {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input.to_vec());
        for layer in &self.layers {
            let next = layer.forward(activations.last().map(Vec::as_slice).unwrap_or(&[]));
            activations.push(next);
        }
        ForwardTrace { activations }
    }

    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.forward(input).activations.pop().unwrap_or_default()
    }

    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        if let Some(first) = self.layers.first() {
            sizes.push(first.inputs());
        }
        sizes.extend(self.layers.iter().map(DenseLayer::outputs));
        sizes
    }
}
