//! Random survival forest adapter: Implementation of `SurvivalModel`.
//!
//! A forest is exported by the training pipeline as a set of binary trees over
//! the 16 contract columns. Every leaf stores a survival function evaluated at
//! the forest's shared event times. Predicting a row walks each tree to a
//! leaf and averages the reached leaves into one survival function.

use serde::{Deserialize, Serialize};

use crate::adapters::ArtifactError;
use crate::domain::{FeatureVector, SurvivalCurve, FEATURE_COUNT};
use crate::ports::{ModelError, SurvivalModel};

/// Forest parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub id: String,
    /// Shared time axis (months) for every leaf survival function
    pub event_times: Vec<f64>,
    pub trees: Vec<ExportedTree>,
}

/// One tree as a flat node array; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        survival: Vec<f64>,
    },
}

/// A validated random survival forest.
#[derive(Debug, Clone)]
pub struct SurvivalForest {
    id: String,
    event_times: Vec<f64>,
    trees: Vec<Vec<TreeNode>>,
}

impl SurvivalForest {
    /// Validate an exported forest.
    ///
    /// Children must come after their parent in the node array, which rules
    /// out cycles and guarantees every walk ends at a leaf.
    ///
    /// # Errors
    /// Returns `ArtifactError::InvalidModel` describing the first problem.
    pub fn from_exported(model: ExportedForest) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::InvalidModel {
            model: model.id.clone(),
            reason,
        };

        if model.trees.is_empty() {
            return Err(invalid("forest has no trees".into()));
        }

        for (t, tree) in model.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(invalid(format!("tree {t} has no nodes")));
            }
            let n = tree.nodes.len();
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(invalid(format!(
                                "tree {t} node {i}: feature index {feature} out of range"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(invalid(format!(
                                "tree {t} node {i}: non-finite threshold"
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= n {
                                return Err(invalid(format!(
                                    "tree {t} node {i}: child index {child} invalid"
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { survival } => {
                        SurvivalCurve::new(model.event_times.clone(), survival.clone())
                            .map_err(|e| invalid(format!("tree {t} node {i}: {e}")))?;
                    }
                }
            }
        }

        Ok(Self {
            id: model.id,
            event_times: model.event_times,
            trees: model.trees.into_iter().map(|t| t.nodes).collect(),
        })
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn leaf_for<'a>(nodes: &'a [TreeNode], x: &[f64]) -> &'a [f64] {
        let mut i = 0;
        loop {
            match &nodes[i] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { survival } => return survival,
            }
        }
    }
}

impl SurvivalModel for SurvivalForest {
    fn id(&self) -> &str {
        &self.id
    }

    fn predict_survival(&self, features: &FeatureVector) -> Result<Vec<SurvivalCurve>, ModelError> {
        let x = features.as_slice();
        let mut mean = vec![0.0; self.event_times.len()];

        for nodes in &self.trees {
            for (acc, s) in mean.iter_mut().zip(Self::leaf_for(nodes, x)) {
                *acc += s;
            }
        }

        let n = self.trees.len() as f64;
        for value in &mut mean {
            *value /= n;
        }

        Ok(vec![SurvivalCurve::new(self.event_times.clone(), mean)?])
    }
}
