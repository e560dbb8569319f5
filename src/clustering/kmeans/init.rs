use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::InitPolicy;
use crate::geometry::{Bounds, Point};

/// Pick `k` starting centroids under `policy`.
///
/// `PlusPlus` falls back to `bounds` when there are no points to sample from.
pub fn initial_centroids<R: Rng + ?Sized>(
    points: &[Point],
    k: usize,
    policy: InitPolicy,
    bounds: Bounds,
    rng: &mut R,
) -> Vec<Point> {
    match policy {
        InitPolicy::Random => (0..k).map(|_| bounds.sample(rng)).collect(),
        InitPolicy::PlusPlus if points.is_empty() => (0..k).map(|_| bounds.sample(rng)).collect(),
        InitPolicy::PlusPlus => plus_plus(points, k, rng),
    }
}

fn plus_plus<R: Rng + ?Sized>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    if k == 0 {
        return centroids;
    }
    centroids.push(points[rng.random_range(0..points.len())]);
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|point| point.distance_squared(centroids[0]))
        .collect();

    while centroids.len() < k {
        // All-zero weights mean every point already coincides with a centroid.
        let next = match WeightedIndex::new(&nearest) {
            Ok(weights) => points[weights.sample(rng)],
            Err(_) => points[rng.random_range(0..points.len())],
        };
        for (distance, point) in nearest.iter_mut().zip(points) {
            *distance = distance.min(point.distance_squared(next));
        }
        centroids.push(next);
    }
    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_policy_samples_within_bounds() {
        let bounds = Bounds::new(0.0, 1.0, 5.0, 6.0);
        let mut rng = StdRng::seed_from_u64(1);
        let centroids = initial_centroids(&[], 12, InitPolicy::Random, bounds, &mut rng);
        assert_eq!(centroids.len(), 12);
        assert!(centroids.iter().all(|centroid| bounds.contains(*centroid)));
    }

    #[test]
    fn plus_plus_picks_existing_points() {
        let points = [Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(0.0, 50.0)];
        let mut rng = StdRng::seed_from_u64(4);
        let centroids =
            initial_centroids(&points, 3, InitPolicy::PlusPlus, Bounds::default(), &mut rng);
        for centroid in &centroids {
            assert!(points.contains(centroid));
        }
        // Zero-distance points carry no weight, so three distinct points are chosen.
        assert_ne!(centroids[0], centroids[1]);
        assert_ne!(centroids[1], centroids[2]);
        assert_ne!(centroids[0], centroids[2]);
    }

    #[test]
    fn plus_plus_handles_duplicate_points() {
        let points = [Point::new(1.0, 1.0); 4];
        let mut rng = StdRng::seed_from_u64(4);
        let centroids =
            initial_centroids(&points, 3, InitPolicy::PlusPlus, Bounds::default(), &mut rng);
        assert_eq!(centroids, vec![Point::new(1.0, 1.0); 3]);
    }

    #[test]
    fn plus_plus_without_points_uses_bounds() {
        let bounds = Bounds::new(0.0, 1.0, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(4);
        let centroids = initial_centroids(&[], 2, InitPolicy::PlusPlus, bounds, &mut rng);
        assert_eq!(centroids.len(), 2);
        assert!(centroids.iter().all(|centroid| bounds.contains(*centroid)));
    }
}
