use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{DatasetError, Samples};
use crate::geometry::Point;

/// Single-feature samples along `y = slope * x + intercept` with Gaussian noise.
pub fn linear_samples<R: Rng + ?Sized>(
    count: usize,
    slope: f64,
    intercept: f64,
    noise: f64,
    x_range: (f64, f64),
    rng: &mut R,
) -> Result<Samples, DatasetError> {
    let normal = Normal::new(0.0, noise).map_err(|_| DatasetError::InvalidSpread(noise))?;
    let (low, high) = if x_range.0 <= x_range.1 {
        x_range
    } else {
        (x_range.1, x_range.0)
    };
    let mut samples = Samples::default();
    for _ in 0..count {
        let x = low + rng.random::<f64>() * (high - low);
        samples.x.push(vec![x]);
        samples.y.push(slope * x + intercept + normal.sample(rng));
    }
    Ok(samples)
}

/// Two-feature binary classification set: class 0 around `negative`, class 1 around `positive`.
pub fn binary_classes<R: Rng + ?Sized>(
    per_class: usize,
    negative: Point,
    positive: Point,
    spread: f64,
    rng: &mut R,
) -> Result<Samples, DatasetError> {
    let normal = Normal::new(0.0, spread).map_err(|_| DatasetError::InvalidSpread(spread))?;
    let mut samples = Samples::default();
    for (target, center) in [(0.0, negative), (1.0, positive)] {
        for _ in 0..per_class {
            samples
                .x
                .push(vec![center.x + normal.sample(rng), center.y + normal.sample(rng)]);
            samples.y.push(target);
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn noiseless_line_is_exact() {
        let mut rng = StdRng::seed_from_u64(2);
        let samples = linear_samples(16, 2.0, -1.0, 0.0, (0.0, 4.0), &mut rng).unwrap();
        assert_eq!(samples.len(), 16);
        for (row, y) in samples.x.iter().zip(&samples.y) {
            assert!((2.0 * row[0] - 1.0 - y).abs() < 1e-12);
            assert!((0.0..=4.0).contains(&row[0]));
        }
    }

    #[test]
    fn binary_classes_are_balanced() {
        let mut rng = StdRng::seed_from_u64(2);
        let samples =
            binary_classes(12, Point::new(-2.0, 0.0), Point::new(2.0, 0.0), 0.5, &mut rng).unwrap();
        assert_eq!(samples.len(), 24);
        let positives = samples.y.iter().filter(|y| **y == 1.0).count();
        assert_eq!(positives, 12);
    }
}
