//! k-nearest-neighbour classification for the decision-region page.
//!
//! Ties in the vote are broken by the single closest neighbour among the tied
//! labels, which keeps region borders stable when `k` is even.

use crate::dataset::LabeledPoint;
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct KnnPrediction {
    pub label: usize,
    /// `(label, votes)` sorted by label.
    pub votes: Vec<(usize, usize)>,
    /// Indices into the sample slice, nearest first.
    pub neighbours: Vec<usize>,
}

/// Classify `query` against `samples`; `None` when there are no samples or `k == 0`.
pub fn classify(samples: &[LabeledPoint], query: Point, k: usize) -> Option<KnnPrediction> {
    if samples.is_empty() || k == 0 {
        return None;
    }
    let mut ranked: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| (idx, sample.point.distance_squared(query)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);

    let max_label = ranked.iter().map(|(idx, _)| samples[*idx].label).max()?;
    let mut counts = vec![0usize; max_label + 1];
    for (idx, _) in &ranked {
        counts[samples[*idx].label] += 1;
    }
    let top = counts.iter().copied().max()?;
    // `ranked` is nearest-first, so the first tied label encountered is the closest.
    let label = ranked
        .iter()
        .map(|(idx, _)| samples[*idx].label)
        .find(|label| counts[*label] == top)?;

    Some(KnnPrediction {
        label,
        votes: counts
            .into_iter()
            .enumerate()
            .filter(|(_, count)| *count > 0)
            .collect(),
        neighbours: ranked.into_iter().map(|(idx, _)| idx).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, label: usize) -> LabeledPoint {
        LabeledPoint {
            point: Point::new(x, y),
            label,
        }
    }

    #[test]
    fn majority_wins() {
        let samples = [
            sample(0.0, 0.0, 0),
            sample(0.1, 0.0, 1),
            sample(0.2, 0.0, 1),
            sample(9.0, 9.0, 0),
        ];
        let prediction = classify(&samples, Point::new(0.0, 0.0), 3).unwrap();
        assert_eq!(prediction.label, 1);
        assert_eq!(prediction.votes, vec![(0, 1), (1, 2)]);
        assert_eq!(prediction.neighbours, vec![0, 1, 2]);
    }

    #[test]
    fn tie_goes_to_closest_tied_label() {
        let samples = [
            sample(3.0, 0.0, 0),
            sample(1.0, 0.0, 2),
            sample(2.0, 0.0, 0),
            sample(0.5, 0.0, 2),
        ];
        let prediction = classify(&samples, Point::new(0.0, 0.0), 4).unwrap();
        assert_eq!(prediction.votes, vec![(0, 2), (2, 2)]);
        assert_eq!(prediction.label, 2);
    }

    #[test]
    fn k_larger_than_samples_uses_all() {
        let samples = [sample(0.0, 0.0, 1)];
        let prediction = classify(&samples, Point::new(5.0, 5.0), 10).unwrap();
        assert_eq!(prediction.label, 1);
        assert_eq!(prediction.neighbours.len(), 1);
    }

    #[test]
    fn empty_inputs_yield_nothing() {
        assert!(classify(&[], Point::new(0.0, 0.0), 3).is_none());
        assert!(classify(&[sample(0.0, 0.0, 0)], Point::new(0.0, 0.0), 0).is_none());
    }
}
