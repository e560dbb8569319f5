use std::collections::VecDeque;

use super::{DbscanError, DbscanParams};
use crate::clustering::{Label, NOISE_LABEL};
use crate::geometry::Point;

/// Classic DBSCAN over a brute-force neighbourhood query.
///
/// A point is core when at least `min_points` points (itself included) lie within
/// `epsilon`. Border points join the first cluster that reaches them. Cluster ids
/// start at 0 in discovery order.
pub fn dbscan(points: &[Point], params: DbscanParams) -> Result<Vec<Label>, DbscanError> {
    params.validate()?;
    let epsilon_sq = params.epsilon * params.epsilon;
    let mut labels: Vec<Option<Label>> = vec![None; points.len()];
    let mut cluster: Label = 0;

    for idx in 0..points.len() {
        if labels[idx].is_some() {
            continue;
        }
        let neighbours = region_query(points, idx, epsilon_sq);
        if neighbours.len() < params.min_points {
            labels[idx] = Some(NOISE_LABEL);
            continue;
        }
        labels[idx] = Some(cluster);
        let mut queue: VecDeque<usize> = neighbours.into();
        while let Some(next) = queue.pop_front() {
            match labels[next] {
                Some(NOISE_LABEL) => {
                    labels[next] = Some(cluster);
                    continue;
                }
                Some(_) => continue,
                None => {}
            }
            labels[next] = Some(cluster);
            let expansion = region_query(points, next, epsilon_sq);
            if expansion.len() >= params.min_points {
                queue.extend(expansion);
            }
        }
        cluster += 1;
    }

    Ok(labels
        .into_iter()
        .map(|label| label.unwrap_or(NOISE_LABEL))
        .collect())
}

fn region_query(points: &[Point], idx: usize, epsilon_sq: f64) -> Vec<usize> {
    let origin = points[idx];
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| point.distance_squared(origin) <= epsilon_sq)
        .map(|(neighbour, _)| neighbour)
        .collect()
}
