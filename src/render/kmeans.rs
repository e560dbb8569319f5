use super::Canvas;
use super::palette::{FOREGROUND, cluster_color, with_alpha};
use crate::clustering::kmeans::{KMeansState, nearest};
use crate::geometry::Point;

const REGION_ALPHA: u8 = 60;
const POINT_RADIUS: f64 = 3.0;
const CENTROID_SIZE: f64 = 6.0;

/// Voronoi tint per pixel, then points coloured by assignment and centroid crosses.
pub fn paint_kmeans(canvas: &mut Canvas, points: &[Point], state: &KMeansState) {
    let centroids = &state.centroids;
    canvas.shade(|world| {
        nearest(world, centroids).map(|idx| with_alpha(cluster_color(idx), REGION_ALPHA))
    });
    for (idx, point) in points.iter().enumerate() {
        let color = state
            .assignments
            .get(idx)
            .map(|cluster| cluster_color(*cluster))
            .unwrap_or(FOREGROUND);
        canvas.fill_disc(*point, POINT_RADIUS, color);
    }
    for (idx, centroid) in centroids.iter().enumerate() {
        canvas.fill_disc(*centroid, CENTROID_SIZE * 0.6, FOREGROUND);
        canvas.draw_cross(*centroid, CENTROID_SIZE, cluster_color(idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::render::palette::{BACKGROUND, blend};

    #[test]
    fn regions_follow_nearest_centroid() {
        let mut canvas = Canvas::new(40, 20, Bounds::new(-10.0, 10.0, -5.0, 5.0));
        let state = KMeansState {
            centroids: vec![Point::new(-5.0, 0.0), Point::new(5.0, 0.0)],
            assignments: Vec::new(),
            iteration: 0,
        };
        paint_kmeans(&mut canvas, &[], &state);
        let left = blend(BACKGROUND, with_alpha(cluster_color(0), REGION_ALPHA));
        let right = blend(BACKGROUND, with_alpha(cluster_color(1), REGION_ALPHA));
        assert_eq!(canvas.pixel(1, 1), Some(left));
        assert_eq!(canvas.pixel(38, 18), Some(right));
    }

    #[test]
    fn points_take_cluster_colour() {
        let mut canvas = Canvas::new(40, 40, Bounds::new(0.0, 40.0, 0.0, 40.0));
        let state = KMeansState {
            centroids: vec![Point::new(35.0, 35.0)],
            assignments: vec![0],
            iteration: 1,
        };
        paint_kmeans(&mut canvas, &[Point::new(5.5, 34.5)], &state);
        assert_eq!(canvas.pixel(5, 5), Some(cluster_color(0)));
    }
}
