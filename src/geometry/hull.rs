use super::Point;

const EPSILON: f64 = 1e-9;

/// Convex hull via Andrew's monotone chain.
///
/// Inputs with fewer than three points are returned unchanged. Otherwise the
/// hull is counter-clockwise, starts at the lowest-x point, and does not repeat
/// its first vertex. Collinear boundary points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], point) <= 0.0
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], point) <= 0.0
        {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Whether `point` lies inside or on a counter-clockwise hull.
pub fn hull_contains(hull: &[Point], point: Point) -> bool {
    match hull.len() {
        0 => false,
        1 => hull[0].distance_squared(point) <= EPSILON,
        2 => on_segment(hull[0], hull[1], point),
        n => (0..n).all(|idx| cross(hull[idx], hull[(idx + 1) % n], point) >= -EPSILON),
    }
}

fn cross(origin: Point, a: Point, b: Point) -> f64 {
    (a.x - origin.x) * (b.y - origin.y) - (a.y - origin.y) * (b.x - origin.x)
}

fn on_segment(a: Point, b: Point, point: Point) -> bool {
    if cross(a, b, point).abs() > EPSILON {
        return false;
    }
    point.x >= a.x.min(b.x) - EPSILON
        && point.x <= a.x.max(b.x) + EPSILON
        && point.y >= a.y.min(b.y) - EPSILON
        && point.y <= a.y.max(b.y) + EPSILON
}
