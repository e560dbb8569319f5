use mlgallery::geometry::{Bounds, Point};

pub const TRIANGLE_CENTERS: [Point; 3] = [
    Point::new(0.0, 0.0),
    Point::new(10.0, 10.0),
    Point::new(-10.0, 10.0),
];

/// Three tight triangles, one around each of [`TRIANGLE_CENTERS`].
pub fn triangles() -> Vec<Point> {
    TRIANGLE_CENTERS
        .iter()
        .flat_map(|center| {
            [
                Point::new(center.x - 0.5, center.y - 0.5),
                Point::new(center.x + 0.5, center.y - 0.5),
                Point::new(center.x, center.y + 0.5),
            ]
        })
        .collect()
}

pub fn triangle_bounds(center: Point) -> Bounds {
    Bounds::new(center.x - 0.5, center.x + 0.5, center.y - 0.5, center.y + 0.5)
}
