//! Request and response bodies for every backend endpoint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clustering::Label;
use crate::ml::activation::Activation;
use crate::ml::impurity::Criterion;
use crate::ml::mlp::DenseLayer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub criterion: Criterion,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 2,
            criterion: Criterion::Gini,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildTreeRequest {
    pub dataset: String,
    pub params: TreeParams,
}

/// One node of a fitted tree. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impurity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeNode>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.left.iter().chain(self.right.iter()).map(Box::as_ref)
    }

    /// Levels below this node; a lone leaf has depth zero.
    pub fn depth(&self) -> usize {
        self.children()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children().map(TreeNode::leaf_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildTreeResponse {
    pub tree: TreeNode,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub subsample_ratio: f64,
    /// Features considered per split, e.g. `sqrt`, `log2` or `all`.
    pub feature_subset: String,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub criterion: Criterion,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 5,
            subsample_ratio: 0.8,
            feature_subset: "sqrt".to_string(),
            max_depth: 3,
            min_samples_split: 2,
            criterion: Criterion::Gini,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildForestRequest {
    pub dataset: String,
    pub params: ForestParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestTree {
    pub tree: TreeNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildForestResponse {
    pub trees: Vec<ForestTree>,
    #[serde(default)]
    pub target_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictForestRequest {
    #[serde(flatten)]
    pub forest: BuildForestRequest,
    pub record: Vec<f64>,
}

/// A class vote, sent either as an index or as a target name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vote {
    Index(i64),
    Name(String),
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Index(index) => write!(f, "{index}"),
            Vote::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictForestResponse {
    pub majority_vote: Vote,
    #[serde(default)]
    pub individual_votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbscanRequest {
    /// `[x, y]` pairs.
    pub points: Vec<[f64; 2]>,
    pub epsilon: f64,
    #[serde(rename = "minPoints")]
    pub min_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbscanResponse {
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionData {
    #[serde(rename = "X")]
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// Body shared by the logistic and linear training endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRequest {
    #[serde(rename = "X")]
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    pub learning_rate: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeRequest {
    pub layer_sizes: Vec<usize>,
    #[serde(default)]
    pub activation: Activation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub layers: Vec<DenseLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTrainRequest {
    pub layers: Vec<DenseLayer>,
    pub input: Vec<f64>,
    pub target: Vec<f64>,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTrainResponse {
    pub layers: Vec<DenseLayer>,
    #[serde(default)]
    pub deltas: Vec<Vec<f64>>,
    #[serde(default)]
    pub activations: Vec<Vec<f64>>,
    #[serde(default)]
    pub loss: f64,
}
