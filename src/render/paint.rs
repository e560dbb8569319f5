use image::Rgba;

use super::Canvas;
use super::palette::blend;
use crate::geometry::{Point, hull_contains};

impl Canvas {
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    /// Alpha-blend one pixel; coordinates outside the raster are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        if coverage <= 0.0 || x < 0 || y < 0 {
            return;
        }
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(pixel) = self.image.get_pixel_mut_checked(x, y) {
            let alpha = (f32::from(color[3]) * coverage.clamp(0.0, 1.0)).round() as u8;
            *pixel = blend(*pixel, Rgba([color[0], color[1], color[2], alpha]));
        }
    }

    /// Tint every pixel with the colour chosen for its world position.
    pub fn shade<F>(&mut self, mut color_at: F)
    where
        F: FnMut(Point) -> Option<Rgba<u8>>,
    {
        for py in 0..self.height() {
            for px in 0..self.width() {
                let world = self.to_world(px, py);
                if let Some(color) = color_at(world) {
                    let base = *self.image.get_pixel(px, py);
                    self.image.put_pixel(px, py, blend(base, color));
                }
            }
        }
    }

    /// Filled disc with a radius in pixels.
    pub fn fill_disc(&mut self, center: Point, radius: f64, color: Rgba<u8>) {
        let (cx, cy) = self.to_pixel(center);
        let radius = radius.max(0.5);
        let min_x = (cx - radius - 1.0).floor() as i64;
        let max_x = (cx + radius + 1.0).ceil() as i64;
        let min_y = (cy - radius - 1.0).floor() as i64;
        let max_y = (cy + radius + 1.0).ceil() as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt();
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0) as f32;
                self.blend_pixel(x, y, color, coverage);
            }
        }
    }

    /// Anti-aliased segment between two world points.
    pub fn stroke_line(&mut self, from: Point, to: Point, color: Rgba<u8>) {
        let (x0, y0) = self.to_pixel(from);
        let (x1, y1) = self.to_pixel(to);
        self.stroke_pixels(x0, y0, x1, y1, color);
    }

    /// Closed outline through the given world points.
    pub fn stroke_polygon(&mut self, points: &[Point], color: Rgba<u8>) {
        match points {
            [] => {}
            [single] => self.fill_disc(*single, 1.0, color),
            _ => {
                for (idx, start) in points.iter().enumerate() {
                    let end = points[(idx + 1) % points.len()];
                    self.stroke_line(*start, end, color);
                }
            }
        }
    }

    /// Tint the interior of a convex polygon.
    pub fn fill_convex(&mut self, hull: &[Point], color: Rgba<u8>) {
        if hull.len() < 3 {
            return;
        }
        let pixels: Vec<(f64, f64)> = hull.iter().map(|point| self.to_pixel(*point)).collect();
        let min_x = pixels.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let max_x = pixels.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max).ceil() as u32;
        let min_y = pixels.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let max_y = pixels.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as u32;
        for py in min_y..=max_y.min(self.height().saturating_sub(1)) {
            for px in min_x..=max_x.min(self.width().saturating_sub(1)) {
                if hull_contains(hull, self.to_world(px, py)) {
                    self.blend_pixel(i64::from(px), i64::from(py), color, 1.0);
                }
            }
        }
    }

    /// Diagonal cross marker, `size` pixels from centre to tip.
    pub fn draw_cross(&mut self, center: Point, size: f64, color: Rgba<u8>) {
        let (cx, cy) = self.to_pixel(center);
        self.stroke_pixels(cx - size, cy - size, cx + size, cy + size, color);
        self.stroke_pixels(cx - size, cy + size, cx + size, cy - size, color);
    }

    fn stroke_pixels(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
        // Shift to pixel-centre coordinates.
        let (mut x0, mut y0, mut x1, mut y1) = (x0 - 0.5, y0 - 0.5, x1 - 0.5, y1 - 0.5);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        let dx = x1 - x0;
        let gradient = if dx.abs() < f64::EPSILON {
            0.0
        } else {
            (y1 - y0) / dx
        };
        let start = x0.round() as i64;
        let end = x1.round() as i64;
        for x in start..=end {
            let y = y0 + gradient * (x as f64 - x0);
            let base = y.floor();
            let frac = (y - base) as f32;
            let y_low = base as i64;
            if steep {
                self.blend_pixel(y_low, x, color, 1.0 - frac);
                self.blend_pixel(y_low + 1, x, color, frac);
            } else {
                self.blend_pixel(x, y_low, color, 1.0 - frac);
                self.blend_pixel(x, y_low + 1, color, frac);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::render::palette::BACKGROUND;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn canvas() -> Canvas {
        Canvas::new(20, 20, Bounds::new(0.0, 20.0, 0.0, 20.0))
    }

    #[test]
    fn out_of_range_pixels_are_ignored() {
        let mut canvas = canvas();
        canvas.blend_pixel(-1, 5, RED, 1.0);
        canvas.blend_pixel(5, 99, RED, 1.0);
        assert!(canvas.image().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn disc_paints_its_centre() {
        let mut canvas = canvas();
        canvas.fill_disc(Point::new(10.5, 9.5), 2.0, RED);
        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn horizontal_line_covers_its_row() {
        let mut canvas = canvas();
        canvas.stroke_line(Point::new(2.0, 9.5), Point::new(18.0, 9.5), RED);
        for x in 2..=18 {
            assert_eq!(canvas.pixel(x, 10), Some(RED), "x = {x}");
        }
        assert_eq!(canvas.pixel(10, 3), Some(BACKGROUND));
    }

    #[test]
    fn convex_fill_stays_inside() {
        let mut canvas = canvas();
        let square = [
            Point::new(5.0, 5.0),
            Point::new(15.0, 5.0),
            Point::new(15.0, 15.0),
            Point::new(5.0, 15.0),
        ];
        canvas.fill_convex(&square, RED);
        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(1, 1), Some(BACKGROUND));
        assert_eq!(canvas.pixel(18, 18), Some(BACKGROUND));
    }
}
