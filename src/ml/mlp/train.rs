use serde::{Deserialize, Serialize};

use super::{Network, NetworkError};

/// Trace of one backpropagation step, shaped like the backend's `/train` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainStep {
    /// Error signal per layer (excluding the input layer), output layer last.
    pub deltas: Vec<Vec<f64>>,
    /// Activations per layer from the forward pass, input first.
    pub activations: Vec<Vec<f64>>,
    /// Half squared error before the update.
    pub loss: f64,
}

/// One SGD step on a single sample with squared-error loss.
pub fn train_step(
    network: &mut Network,
    input: &[f64],
    target: &[f64],
    learning_rate: f64,
) -> Result<TrainStep, NetworkError> {
    network.validate(input.len())?;
    let outputs = network.layers.last().map(|layer| layer.outputs()).unwrap_or(0);
    if target.len() != outputs {
        return Err(NetworkError::ShapeMismatch {
            layer: network.layers.len().saturating_sub(1),
            expected: outputs,
            actual: target.len(),
        });
    }

    let activations = network.forward(input).activations;
    let output = activations.last().map(Vec::as_slice).unwrap_or(&[]);
    let loss = 0.5
        * output
            .iter()
            .zip(target)
            .map(|(o, t)| (o - t) * (o - t))
            .sum::<f64>();

    let layer_count = network.layers.len();
    let mut deltas: Vec<Vec<f64>> = vec![Vec::new(); layer_count];
    for idx in (0..layer_count).rev() {
        let layer = &network.layers[idx];
        let own = &activations[idx + 1];
        deltas[idx] = if idx + 1 == layer_count {
            own.iter()
                .zip(target)
                .map(|(o, t)| (o - t) * layer.activation.derivative_from_output(*o))
                .collect()
        } else {
            let next = &network.layers[idx + 1];
            let next_delta = &deltas[idx + 1];
            own.iter()
                .enumerate()
                .map(|(j, a)| {
                    let back: f64 = next
                        .weights
                        .iter()
                        .zip(next_delta)
                        .map(|(row, delta)| row[j] * delta)
                        .sum();
                    back * layer.activation.derivative_from_output(*a)
                })
                .collect()
        };
    }

    for (idx, layer) in network.layers.iter_mut().enumerate() {
        let inputs = &activations[idx];
        for ((row, bias), delta) in layer.weights.iter_mut().zip(&mut layer.biases).zip(&deltas[idx]) {
            for (weight, x) in row.iter_mut().zip(inputs) {
                *weight -= learning_rate * delta * x;
            }
            *bias -= learning_rate * delta;
        }
    }

    Ok(TrainStep {
        deltas,
        activations,
        loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::activation::Activation;
    use crate::ml::mlp::DenseLayer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn repeated_steps_reduce_loss() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::initialize(&[2, 3, 1], Activation::Sigmoid, &mut rng).unwrap();
        let first = train_step(&mut network, &[1.0, 0.0], &[1.0], 0.5).unwrap();
        let mut last = first.clone();
        for _ in 0..200 {
            last = train_step(&mut network, &[1.0, 0.0], &[1.0], 0.5).unwrap();
        }
        assert!(last.loss < first.loss);
        assert_eq!(first.deltas.len(), 2);
        assert_eq!(first.deltas[0].len(), 3);
        assert_eq!(first.activations.len(), 3);
    }

    #[test]
    fn single_linear_unit_follows_delta_rule() {
        let mut network = Network {
            layers: vec![DenseLayer {
                weights: vec![vec![0.0, 0.0]],
                biases: vec![0.0],
                activation: Activation::Linear,
            }],
        };
        let step = train_step(&mut network, &[1.0, 2.0], &[1.0], 0.1).unwrap();
        assert_eq!(step.deltas, vec![vec![-1.0]]);
        assert_eq!(step.loss, 0.5);
        assert_eq!(network.layers[0].weights[0], vec![0.1, 0.2]);
        assert_eq!(network.layers[0].biases[0], 0.1);
    }

    #[test]
    fn wrong_target_length_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::initialize(&[2, 1], Activation::Sigmoid, &mut rng).unwrap();
        assert!(train_step(&mut network, &[1.0, 0.0], &[1.0, 0.0], 0.5).is_err());
    }
}
