use super::Canvas;
use super::palette::{cluster_color, label_color, with_alpha};
use crate::clustering::Label;
use crate::clustering::dbscan::ClusterHull;
use crate::geometry::Point;

const HULL_ALPHA: u8 = 50;

/// Hull tint and outline per cluster, then every point in its label colour.
pub fn paint_density_overlay(
    canvas: &mut Canvas,
    points: &[Point],
    labels: &[Label],
    hulls: &[ClusterHull],
) {
    for hull in hulls {
        let color = cluster_color(hull.label.max(0) as usize);
        canvas.fill_convex(&hull.hull, with_alpha(color, HULL_ALPHA));
        canvas.stroke_polygon(&hull.hull, color);
    }
    for (point, label) in points.iter().zip(labels) {
        canvas.fill_disc(*point, 3.0, label_color(*label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::NOISE_LABEL;
    use crate::clustering::dbscan::cluster_hulls;
    use crate::geometry::Bounds;
    use crate::render::palette::{BACKGROUND, NOISE, blend};

    #[test]
    fn noise_is_drawn_outside_any_hull() {
        let points = vec![
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(5.0, 8.0),
            Point::new(17.5, 17.5),
        ];
        let labels = vec![0, 0, 0, NOISE_LABEL];
        let hulls = cluster_hulls(&points, &labels).unwrap();
        let mut canvas = Canvas::new(20, 20, Bounds::new(0.0, 20.0, 0.0, 20.0));
        paint_density_overlay(&mut canvas, &points, &labels, &hulls);

        let inside = blend(BACKGROUND, with_alpha(cluster_color(0), HULL_ALPHA));
        assert_eq!(canvas.pixel(5, 15), Some(inside));
        assert_eq!(canvas.pixel(17, 2), Some(NOISE));
        assert_eq!(canvas.pixel(12, 12), Some(BACKGROUND));
    }
}
