use std::collections::{BTreeMap, HashMap};

use super::DbscanError;
use crate::clustering::{Label, NOISE_LABEL};
use crate::geometry::{Point, convex_hull};

/// Hull outline for one labelled cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHull {
    pub label: Label,
    pub hull: Vec<Point>,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSummary {
    pub cluster_count: usize,
    pub noise_count: usize,
    pub noise_ratio: f64,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
}

pub fn validate_labels(points: &[Point], labels: &[Label]) -> Result<(), DbscanError> {
    if points.len() != labels.len() {
        return Err(DbscanError::LabelLengthMismatch {
            points: points.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}

/// Convex hull per cluster label in ascending label order.
///
/// Noise points never contribute to a hull. Any negative label is treated as noise.
pub fn cluster_hulls(points: &[Point], labels: &[Label]) -> Result<Vec<ClusterHull>, DbscanError> {
    validate_labels(points, labels)?;
    let mut groups: BTreeMap<Label, Vec<Point>> = BTreeMap::new();
    for (point, &label) in points.iter().zip(labels) {
        if label == NOISE_LABEL || label < 0 {
            continue;
        }
        groups.entry(label).or_default().push(*point);
    }
    Ok(groups
        .into_iter()
        .map(|(label, members)| ClusterHull {
            label,
            size: members.len(),
            hull: convex_hull(&members),
        })
        .collect())
}

pub fn summarize_labels(labels: &[Label]) -> LabelSummary {
    let mut cluster_counts: HashMap<Label, usize> = HashMap::new();
    let mut noise = 0usize;
    for label in labels {
        if *label < 0 {
            noise += 1;
        } else {
            *cluster_counts.entry(*label).or_insert(0) += 1;
        }
    }
    let total = labels.len().max(1) as f64;
    let min_cluster_size = cluster_counts.values().copied().min().unwrap_or(0);
    let max_cluster_size = cluster_counts.values().copied().max().unwrap_or(0);
    LabelSummary {
        cluster_count: cluster_counts.len(),
        noise_count: noise,
        noise_ratio: noise as f64 / total,
        min_cluster_size,
        max_cluster_size,
    }
}
