use super::Canvas;
use super::palette::{FOREGROUND, GRID, NOISE, with_alpha};
use crate::clustering::som::SomState;
use crate::geometry::Point;

/// Data points, then lattice edges between neighbouring nodes, then the nodes.
pub fn paint_som(canvas: &mut Canvas, points: &[Point], state: &SomState) {
    for point in points {
        canvas.fill_disc(*point, 2.0, with_alpha(NOISE, 160));
    }
    for row in 0..state.grid_height {
        for column in 0..state.grid_width {
            let Some(node) = state.node(column, row) else {
                continue;
            };
            if let Some(right) = state.node(column + 1, row) {
                canvas.stroke_line(node, right, GRID);
            }
            if let Some(below) = state.node(column, row + 1) {
                canvas.stroke_line(node, below, GRID);
            }
        }
    }
    for node in &state.nodes {
        canvas.fill_disc(*node, 2.5, FOREGROUND);
    }
}
