use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::{DatasetError, LabeledPoint};
use crate::geometry::{Bounds, Point};

/// Random blob centres kept `margin` away from the edges of `bounds`.
pub fn blob_centers<R: Rng + ?Sized>(
    count: usize,
    bounds: Bounds,
    margin: f64,
    rng: &mut R,
) -> Result<Vec<Point>, DatasetError> {
    if !bounds.is_valid() {
        return Err(DatasetError::InvalidBounds(bounds));
    }
    let inner = bounds.padded(-margin.max(0.0));
    // Fall back to the full region when the margin eats it entirely.
    let region = if inner.is_valid() { inner } else { bounds };
    Ok((0..count).map(|_| region.sample(rng)).collect())
}

/// Isotropic Gaussian cloud around `center`.
pub fn gaussian_blob<R: Rng + ?Sized>(
    center: Point,
    count: usize,
    spread: f64,
    rng: &mut R,
) -> Result<Vec<Point>, DatasetError> {
    let normal = Normal::new(0.0, spread).map_err(|_| DatasetError::InvalidSpread(spread))?;
    if !spread.is_finite() {
        return Err(DatasetError::InvalidSpread(spread));
    }
    Ok((0..count)
        .map(|_| Point::new(center.x + normal.sample(rng), center.y + normal.sample(rng)))
        .collect())
}

/// One Gaussian blob per centre, labelled by centre index.
pub fn labeled_blobs<R: Rng + ?Sized>(
    centers: &[Point],
    per_blob: usize,
    spread: f64,
    rng: &mut R,
) -> Result<Vec<LabeledPoint>, DatasetError> {
    let mut samples = Vec::with_capacity(centers.len() * per_blob);
    for (label, center) in centers.iter().enumerate() {
        for point in gaussian_blob(*center, per_blob, spread, rng)? {
            samples.push(LabeledPoint { point, label });
        }
    }
    Ok(samples)
}

/// Clustered blobs plus uniform noise for the density-clustering page.
///
/// `noise_ratio` is the share of the returned points that are uniform noise.
/// Noise points are appended after the clustered ones.
pub fn dbscan_demo<R: Rng + ?Sized>(
    clusters: usize,
    per_cluster: usize,
    spread: f64,
    noise_ratio: f64,
    bounds: Bounds,
    rng: &mut R,
) -> Result<Vec<Point>, DatasetError> {
    if !(0.0..=0.9).contains(&noise_ratio) {
        return Err(DatasetError::InvalidNoiseRatio(noise_ratio));
    }
    let centers = blob_centers(clusters, bounds, spread * 3.0, rng)?;
    let mut points = Vec::with_capacity(clusters * per_cluster);
    for center in centers {
        points.extend(gaussian_blob(center, per_cluster, spread, rng)?);
    }
    let clustered = points.len() as f64;
    let noise_count = (clustered * noise_ratio / (1.0 - noise_ratio)).round() as usize;
    points.extend((0..noise_count).map(|_| bounds.sample(rng)));
    Ok(points)
}
