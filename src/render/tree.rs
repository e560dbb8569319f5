use super::Canvas;
use super::palette::{FOREGROUND, GRID, cluster_color};
use crate::backend::api::TreeNode;
use crate::geometry::{Bounds, Point};

const NODE_RADIUS: f64 = 5.0;

struct PlacedNode {
    at: Point,
    children: Vec<Point>,
    class: Option<usize>,
    leaf: bool,
}

/// Draw a fitted tree top-down: leaves on consecutive columns, parents centred over
/// their children, one row per depth level. The canvas world is replaced to fit.
pub fn paint_tree(canvas: &mut Canvas, root: &TreeNode) {
    let mut placed = Vec::with_capacity(root.node_count());
    let mut next_leaf = 0.0;
    place(root, 0, &mut next_leaf, &mut placed);
    let depth = root.depth() as f64;
    canvas.set_world(Bounds::new(-0.5, next_leaf - 0.5, -depth - 0.5, 0.5));

    for node in &placed {
        for child in &node.children {
            canvas.stroke_line(node.at, *child, GRID);
        }
    }
    for node in &placed {
        let color = match (node.leaf, node.class) {
            (true, Some(class)) => cluster_color(class),
            _ => FOREGROUND,
        };
        canvas.fill_disc(node.at, NODE_RADIUS, color);
    }
}

fn place(node: &TreeNode, depth: usize, next_leaf: &mut f64, out: &mut Vec<PlacedNode>) -> Point {
    let y = -(depth as f64);
    if node.is_leaf() {
        let at = Point::new(*next_leaf, y);
        *next_leaf += 1.0;
        out.push(PlacedNode {
            at,
            children: Vec::new(),
            class: predicted_class(node),
            leaf: true,
        });
        return at;
    }
    let children: Vec<Point> = node
        .children()
        .map(|child| place(child, depth + 1, next_leaf, out))
        .collect();
    let x = children.iter().map(|child| child.x).sum::<f64>() / children.len().max(1) as f64;
    let at = Point::new(x, y);
    out.push(PlacedNode {
        at,
        children,
        class: None,
        leaf: false,
    });
    at
}

/// Explicit `class` index, else the argmax of the `value` class counts.
fn predicted_class(node: &TreeNode) -> Option<usize> {
    if let Some(class) = node.class.as_ref().and_then(serde_json::Value::as_u64) {
        return usize::try_from(class).ok();
    }
    let mut counts = Vec::new();
    flatten_numbers(node.value.as_ref()?, &mut counts);
    counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(idx, _)| idx)
}

fn flatten_numbers(value: &serde_json::Value, out: &mut Vec<f64>) {
    match value {
        serde_json::Value::Number(number) => out.extend(number.as_f64()),
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_numbers(item, out);
            }
        }
        _ => {}
    }
}
