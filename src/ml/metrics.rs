//! Evaluation metrics for the classifier pages.

#[derive(Debug, Clone, PartialEq)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Build from parallel truth/prediction slices; out-of-range pairs are skipped.
    pub fn from_pairs(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (t, p) in truth.iter().zip(predicted) {
            cm.add(*t, *p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Overall accuracy; zero for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total: u64 = self.counts.iter().map(|v| u64::from(*v)).sum();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = (0..self.n_classes).map(|c| u64::from(self.get(c, c))).sum();
        correct as f64 / total as f64
    }
}

/// Share of matching entries between two label slices.
pub fn accuracy<T: PartialEq>(truth: &[T], predicted: &[T]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / total as f64
}
