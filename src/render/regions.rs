use image::Rgba;

use super::Canvas;
use super::palette::{cluster_color, with_alpha};
use crate::dataset::{LabeledPoint, Samples};
use crate::geometry::Point;

const REGION_ALPHA: u8 = 55;

/// Tint each pixel by the class a classifier predicts for it; `None` leaves the pixel alone.
pub fn paint_decision_regions<F>(canvas: &mut Canvas, mut classify: F)
where
    F: FnMut(Point) -> Option<usize>,
{
    canvas.shade(|world| classify(world).map(|class| with_alpha(cluster_color(class), REGION_ALPHA)));
}

pub fn paint_labeled_points(canvas: &mut Canvas, samples: &[LabeledPoint]) {
    for sample in samples {
        canvas.fill_disc(sample.point, 3.0, cluster_color(sample.label));
    }
}

/// Two-feature samples coloured by their (0/1) target. Rows with fewer than two features are skipped.
pub fn paint_samples(canvas: &mut Canvas, samples: &Samples) {
    for (row, target) in samples.x.iter().zip(&samples.y) {
        if let [x, y, ..] = row.as_slice() {
            let class = if *target >= 0.5 { 1 } else { 0 };
            canvas.fill_disc(Point::new(*x, *y), 3.0, cluster_color(class));
        }
    }
}

/// `y = slope * x + intercept` across the visible world width.
pub fn paint_line(canvas: &mut Canvas, slope: f64, intercept: f64, color: Rgba<u8>) {
    let world = canvas.world();
    let from = Point::new(world.min_x, slope * world.min_x + intercept);
    let to = Point::new(world.max_x, slope * world.max_x + intercept);
    if from.is_finite() && to.is_finite() {
        canvas.stroke_line(from, to, color);
    }
}
