use rand::Rng;

use crate::geometry::{Bounds, Point};

/// Nearest centroid per point by squared distance.
///
/// Ties go to the lowest centroid index. With no centroids the result is empty.
pub fn assign(points: &[Point], centroids: &[Point]) -> Vec<usize> {
    if centroids.is_empty() {
        return Vec::new();
    }
    points
        .iter()
        .filter_map(|point| nearest(*point, centroids))
        .collect()
}

/// Index of the centroid nearest to `point`, first index on ties.
pub fn nearest(point: Point, centroids: &[Point]) -> Option<usize> {
    let first = centroids.first()?;
    let mut best = 0usize;
    let mut best_distance = point.distance_squared(*first);
    for (idx, centroid) in centroids.iter().enumerate().skip(1) {
        let distance = point.distance_squared(*centroid);
        if distance < best_distance {
            best = idx;
            best_distance = distance;
        }
    }
    Some(best)
}

/// Mean of each cluster's points; empty clusters restart at a random spot in `bounds`.
pub fn update_centroids<R: Rng + ?Sized>(
    points: &[Point],
    assignments: &[usize],
    k: usize,
    bounds: Bounds,
    rng: &mut R,
) -> Vec<Point> {
    let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
    for (point, &cluster) in points.iter().zip(assignments) {
        let Some(entry) = sums.get_mut(cluster) else {
            continue;
        };
        entry.0 += point.x;
        entry.1 += point.y;
        entry.2 += 1;
    }
    sums.into_iter()
        .map(|(sum_x, sum_y, count)| {
            if count == 0 {
                bounds.sample(rng)
            } else {
                let denom = count as f64;
                Point::new(sum_x / denom, sum_y / denom)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ties_go_to_first_centroid() {
        let centroids = [Point::new(-1.0, 0.0), Point::new(1.0, 0.0)];
        let assignments = assign(&[Point::new(0.0, 0.0), Point::new(0.9, 0.0)], &centroids);
        assert_eq!(assignments, vec![0, 1]);
    }

    #[test]
    fn centroid_is_mean_of_assigned_points() {
        let points = [
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Point::new(5.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let assignments = [0, 0, 0, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let centroids = update_centroids(&points, &assignments, 2, Bounds::default(), &mut rng);
        assert_eq!(centroids[0], Point::new(3.0, 2.0));
        assert_eq!(centroids[1], Point::new(100.0, 100.0));
    }

    #[test]
    fn empty_cluster_is_reset_inside_bounds() {
        let points = [Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        let bounds = Bounds::new(10.0, 11.0, -3.0, -2.0);
        let mut rng = StdRng::seed_from_u64(8);
        let centroids = update_centroids(&points, &[0, 0], 3, bounds, &mut rng);
        for centroid in &centroids[1..] {
            assert!(centroid.is_finite());
            assert!(bounds.contains(*centroid));
        }
    }

    #[test]
    fn no_centroids_means_no_assignments() {
        assert!(assign(&[Point::new(0.0, 0.0)], &[]).is_empty());
    }
}
