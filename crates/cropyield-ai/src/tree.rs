//! Decision-tree ensemble regressor loaded from a JSON export.
//!
//! Covers the tree models commonly used for tabular yield data: random
//! forests (`mean` aggregation) and gradient-boosted trees (`sum`
//! aggregation scaled by the learning rate).
//!
//! # Format
//!
//! ```json
//! {
//!   "feature_names": ["Region", "Soil_Type", ..., "Days_to_Harvest"],
//!   "aggregation": "mean",
//!   "base_score": 0.0,
//!   "learning_rate": 1.0,
//!   "trees": [{ "nodes": [
//!     { "feature": 3, "threshold": 500.0, "left": 1, "right": 2 },
//!     { "value": 3.1 },
//!     { "value": 5.4 }
//!   ]}]
//! }
//! ```
//!
//! Node 0 is the root. A split sends the row left when
//! `x[feature] <= threshold`, comparing at `f32` precision as the
//! exporting trees do.

use std::fmt;
use std::path::{Path, PathBuf};

use cropyield_core::{FEATURE_COUNT, FEATURE_NAMES, FeatureRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::model::{ModelInfo, Regressor};

/// How per-tree outputs combine into one prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// `base_score + mean(tree outputs)` (random forest).
    #[default]
    Mean,
    /// `base_score + learning_rate * sum(tree outputs)` (gradient boosting).
    Sum,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => f.write_str("mean"),
            Self::Sum => f.write_str("sum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. Requires a validated tree.
    fn evaluate(&self, x: &[f32; FEATURE_COUNT]) -> f64 {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if f64::from(x[*feature]) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        let invalid = |msg: String| ModelError::Invalid(format!("tree {tree_idx}: {msg}"));

        if self.nodes.is_empty() {
            return Err(invalid("has no nodes".into()));
        }

        let n = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("node {i} has non-finite value")));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(invalid(format!(
                            "node {i} splits on feature {feature}, only {FEATURE_COUNT} exist"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {i} has non-finite threshold")));
                    }
                    // Children must come after their parent, which rules out cycles.
                    for child in [left, right] {
                        if child <= i || child >= n {
                            return Err(invalid(format!(
                                "node {i} has child {child} outside {}..{n}",
                                i + 1
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match nodes[i] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

/// A tree ensemble regressor over the nine yield features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    /// Read and validate a JSON export from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        let mut model = Self::from_json(&text)?;
        model.source = Some(path.to_path_buf());
        Ok(model)
    }

    /// Parse and validate a JSON export.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    /// Check structure and that the model was trained on the expected columns.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".into()));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelError::Invalid(
                "base_score and learning_rate must be finite".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }

    /// Combine every tree's output for one row.
    pub fn predict_row(&self, row: &FeatureRow) -> f64 {
        let x = row.to_f32();
        let total: f64 = self.trees.iter().map(|t| t.evaluate(&x)).sum();
        match self.aggregation {
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + self.learning_rate * total,
        }
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&mut self, row: &FeatureRow) -> Result<f64, ModelError> {
        let y = self.predict_row(row);
        debug!(prediction = y, trees = self.trees.len(), "tree ensemble prediction");
        if !y.is_finite() {
            return Err(ModelError::Inference(format!("non-finite prediction {y}")));
        }
        Ok(y)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            format: "tree-ensemble",
            path: self.source.clone(),
            detail: format!(
                "{} trees, {} aggregation, max depth {}",
                self.tree_count(),
                self.aggregation,
                self.max_depth()
            ),
        }
    }
}
