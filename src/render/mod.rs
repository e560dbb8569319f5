//! Raster canvas with a world-coordinate viewport plus the per-page painters.

mod hulls;
mod kmeans;
mod paint;
pub mod palette;
mod regions;
mod som;
mod tree;

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::geometry::{Bounds, Point};

pub use hulls::paint_density_overlay;
pub use kmeans::paint_kmeans;
pub use regions::{paint_decision_regions, paint_labeled_points, paint_line, paint_samples};
pub use som::paint_som;
pub use tree::paint_tree;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write image {path}: {source}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// RGBA raster mapped onto a rectangle of world space (y up).
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    world: Bounds,
}

impl Canvas {
    /// Create a canvas filled with the background colour. Zero sizes are bumped to one pixel.
    pub fn new(width: u32, height: u32, world: Bounds) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            image: RgbaImage::from_pixel(width, height, palette::BACKGROUND),
            world,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn world(&self) -> Bounds {
        self.world
    }

    pub fn set_world(&mut self, world: Bounds) {
        self.world = world;
    }

    /// Continuous pixel coordinates of a world point; pixel y grows downward.
    pub fn to_pixel(&self, point: Point) -> (f64, f64) {
        let width = f64::from(self.width());
        let height = f64::from(self.height());
        let span_x = self.world.width();
        let span_y = self.world.height();
        let x = if span_x > 0.0 {
            (point.x - self.world.min_x) / span_x * width
        } else {
            width / 2.0
        };
        let y = if span_y > 0.0 {
            (self.world.max_y - point.y) / span_y * height
        } else {
            height / 2.0
        };
        (x, y)
    }

    /// World coordinates of the centre of pixel `(px, py)`.
    pub fn to_world(&self, px: u32, py: u32) -> Point {
        let fx = (f64::from(px) + 0.5) / f64::from(self.width());
        let fy = (f64::from(py) + 0.5) / f64::from(self.height());
        Point::new(
            self.world.min_x + fx * self.world.width(),
            self.world.max_y - fy * self.world.height(),
        )
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the canvas as PNG, creating the parent directory when needed.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| RenderError::Save {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_canvas_is_bumped() {
        let canvas = Canvas::new(0, 0, Bounds::default());
        assert_eq!((canvas.width(), canvas.height()), (1, 1));
    }

    #[test]
    fn world_corners_map_to_pixel_corners() {
        let canvas = Canvas::new(200, 100, Bounds::new(-10.0, 10.0, 0.0, 5.0));
        assert_eq!(canvas.to_pixel(Point::new(-10.0, 5.0)), (0.0, 0.0));
        assert_eq!(canvas.to_pixel(Point::new(10.0, 0.0)), (200.0, 100.0));
        assert_eq!(canvas.to_pixel(Point::new(0.0, 2.5)), (100.0, 50.0));
    }

    #[test]
    fn to_world_returns_pixel_centres() {
        let canvas = Canvas::new(10, 10, Bounds::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(canvas.to_world(0, 0), Point::new(0.5, 9.5));
        assert_eq!(canvas.to_world(9, 9), Point::new(9.5, 0.5));
    }

    #[test]
    fn save_png_writes_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames").join("frame.png");
        let canvas = Canvas::new(12, 8, Bounds::default());
        canvas.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 8));
    }
}
