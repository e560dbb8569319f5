//! Single perceptron with the classic error-driven update rule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perceptron {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub learning_rate: f64,
}

impl Perceptron {
    pub fn new(inputs: usize, learning_rate: f64) -> Self {
        Self {
            weights: vec![0.0; inputs],
            bias: 0.0,
            learning_rate,
        }
    }

    /// Weighted sum before thresholding. Extra or missing inputs are ignored.
    pub fn net_input(&self, inputs: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(inputs)
                .map(|(weight, input)| weight * input)
                .sum::<f64>()
    }

    /// Step activation: 1 when the net input is non-negative, else 0.
    pub fn predict(&self, inputs: &[f64]) -> u8 {
        u8::from(self.net_input(inputs) >= 0.0)
    }

    /// Apply `w += lr * (target - prediction) * x`; returns whether anything changed.
    pub fn update(&mut self, inputs: &[f64], target: u8) -> bool {
        let error = f64::from(target) - f64::from(self.predict(inputs));
        if error == 0.0 {
            return false;
        }
        let scale = self.learning_rate * error;
        for (weight, input) in self.weights.iter_mut().zip(inputs) {
            *weight += scale * input;
        }
        self.bias += scale;
        true
    }

    /// One pass over the samples; returns the number of misclassified samples.
    pub fn train_epoch(&mut self, samples: &[(Vec<f64>, u8)]) -> usize {
        samples
            .iter()
            .filter(|(inputs, target)| self.update(inputs, *target))
            .count()
    }

    /// `(slope, intercept)` of the 2D decision line `w0*x + w1*y + b = 0`.
    ///
    /// `None` for non-2D perceptrons or a vertical/undefined boundary.
    pub fn decision_line(&self) -> Option<(f64, f64)> {
        let [w0, w1] = self.weights.as_slice() else {
            return None;
        };
        if w1.abs() < f64::EPSILON {
            return None;
        }
        Some((-w0 / w1, -self.bias / w1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_gate() -> Vec<(Vec<f64>, u8)> {
        vec![
            (vec![0.0, 0.0], 0),
            (vec![0.0, 1.0], 0),
            (vec![1.0, 0.0], 0),
            (vec![1.0, 1.0], 1),
        ]
    }

    #[test]
    fn learns_linearly_separable_gate() {
        let mut perceptron = Perceptron::new(2, 0.1);
        let mut errors = usize::MAX;
        for _ in 0..50 {
            errors = perceptron.train_epoch(&and_gate());
            if errors == 0 {
                break;
            }
        }
        assert_eq!(errors, 0);
        for (inputs, target) in and_gate() {
            assert_eq!(perceptron.predict(&inputs), target);
        }
        assert!(perceptron.decision_line().is_some());
    }

    #[test]
    fn correct_prediction_leaves_weights_alone() {
        let mut perceptron = Perceptron::new(2, 0.5);
        assert!(!perceptron.update(&[1.0, 1.0], 1));
        assert_eq!(perceptron.weights, vec![0.0, 0.0]);
        assert!(perceptron.update(&[1.0, 2.0], 0));
        assert_eq!(perceptron.weights, vec![-0.5, -1.0]);
        assert_eq!(perceptron.bias, -0.5);
    }
}
