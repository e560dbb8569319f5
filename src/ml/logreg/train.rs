use super::{LogRegModel, LogisticHistory, log_loss};
use crate::dataset::Samples;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub iterations: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            iterations: 100,
        }
    }
}

/// Full-batch gradient descent from zero weights.
///
/// Entry `i` of the history holds the weights and loss after `i + 1` updates.
pub fn train_history(samples: &Samples, options: &TrainOptions) -> Result<LogisticHistory, String> {
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
    if let Some(bad) = samples.y.iter().find(|y| **y != 0.0 && **y != 1.0) {
        return Err(format!("Targets must be 0 or 1 (got {bad})"));
    }

    let rows = samples.len() as f64;
    let mut model = LogRegModel {
        weights: vec![0.0; dim + 1],
    };
    let mut history = LogisticHistory::default();
    let mut probabilities = probabilities_for(&model, samples);

    for _ in 0..options.iterations {
        let mut gradient = vec![0.0f64; dim + 1];
        for ((row, target), p) in samples.x.iter().zip(&samples.y).zip(&probabilities) {
            let error = p - target;
            gradient[0] += error;
            for (slot, value) in gradient[1..].iter_mut().zip(row) {
                *slot += error * value;
            }
        }
        for (weight, grad) in model.weights.iter_mut().zip(&gradient) {
            *weight -= options.learning_rate * grad / rows;
        }
        probabilities = probabilities_for(&model, samples);
        history.weights_history.push(model.weights.clone());
        history.loss_history.push(log_loss(&probabilities, &samples.y));
    }

    history.final_loss = log_loss(&probabilities, &samples.y);
    history.final_predictions = probabilities
        .iter()
        .map(|p| if *p >= 0.5 { 1.0 } else { 0.0 })
        .collect();
    Ok(history)
}

fn probabilities_for(model: &LogRegModel, samples: &Samples) -> Vec<f64> {
    samples.x.iter().map(|row| model.predict_proba(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> Samples {
        Samples {
            x: vec![
                vec![-2.0, -1.0],
                vec![-1.5, -2.0],
                vec![-1.0, -1.0],
                vec![1.0, 1.0],
                vec![1.5, 2.0],
                vec![2.0, 1.0],
            ],
            y: vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn loss_decreases_and_points_are_separated() {
        let history = train_history(
            &separable(),
            &TrainOptions {
                learning_rate: 0.5,
                iterations: 200,
            },
        )
        .unwrap();
        assert_eq!(history.weights_history.len(), 200);
        assert_eq!(history.loss_history.len(), 200);
        assert!(history.loss_history[199] < history.loss_history[0]);
        assert_eq!(history.final_predictions, separable().y);
        assert_eq!(history.final_loss, history.loss_history[199]);
        history.validate(6).unwrap();
    }

    #[test]
    fn zero_iterations_reports_initial_loss() {
        let history = train_history(
            &separable(),
            &TrainOptions {
                learning_rate: 0.1,
                iterations: 0,
            },
        )
        .unwrap();
        assert!(history.weights_history.is_empty());
        assert!((history.final_loss - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn non_binary_targets_are_rejected() {
        let mut samples = separable();
        samples.y[0] = 2.0;
        assert!(train_history(&samples, &TrainOptions::default()).is_err());
    }
}
