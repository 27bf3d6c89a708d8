//! Random forest evaluation
//!
//! Each tree is a flat array of nodes in pre-order, so node `0` is the root
//! and every child index is greater than its parent's. A split sends a sample
//! left when `x[feature] <= threshold`. A leaf stores per-class weights
//! (sample counts or fractions); the tree's probabilities are those weights
//! normalized to one. The forest averages its trees.

use crate::error::{ModelError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Checks the structural rules that make [`Self::leaf_for`] total.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {index} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {index} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        // forward-only edges rule out cycles
                        if child <= index || child >= self.nodes.len() {
                            return Err(ModelError::InvalidArtifact(format!(
                                "node {index} points to invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(ModelError::InvalidArtifact(format!(
                            "leaf {index} has {} class weights, model has {n_classes} classes",
                            value.len()
                        )));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(ModelError::InvalidArtifact(format!(
                            "leaf {index} has a negative or non-finite weight"
                        )));
                    }
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 {
                        return Err(ModelError::InvalidArtifact(format!(
                            "leaf {index} has no weight"
                        )));
                    }
                    // normalizing by an infinite total would zero the leaf
                    if !total.is_finite() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "leaf {index} weights overflow"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Walks from the root to the leaf that `x` falls into.
    ///
    /// Only call on a validated tree with `x.len() >= n_features`.
    fn leaf_for(&self, x: ArrayView1<f64>) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    /// Labels in the order leaf weights are stored.
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(ModelError::InvalidArtifact(
                "model declares zero features".to_string(),
            ));
        }
        if self.classes.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "model declares no classes".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.is_empty() {
                return Err(ModelError::InvalidArtifact("empty class label".to_string()));
            }
            if !seen.insert(class.as_str()) {
                return Err(ModelError::InvalidArtifact(format!(
                    "duplicate class label `{class}`"
                )));
            }
        }
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("model has no trees".to_string()));
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes())
                .map_err(|e| match e {
                    ModelError::InvalidArtifact(msg) => {
                        ModelError::InvalidArtifact(format!("tree {index}: {msg}"))
                    }
                    other => other,
                })?;
        }

        Ok(())
    }

    /// Class probabilities for one sample, in [`Self::classes`] order.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>> {
        if x.len() != self.n_features {
            return Err(ModelError::Inference(format!(
                "expected {} features, got {}",
                self.n_features,
                x.len()
            )));
        }

        let mut proba = Array1::<f64>::zeros(self.n_classes());
        for tree in &self.trees {
            let leaf = tree.leaf_for(x);
            let total: f64 = leaf.iter().sum();
            for (slot, weight) in proba.iter_mut().zip(leaf) {
                *slot += weight / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.mapv_inplace(|p| p / n_trees);
        Ok(proba)
    }

    /// Row-wise [`Self::predict_proba`]; one output row per input row.
    pub fn predict_proba_batch(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(ModelError::Inference(format!(
                "expected {} feature columns, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_classes()));
        for (row, mut target) in x.rows().into_iter().zip(out.rows_mut()) {
            target.assign(&self.predict_proba(row)?);
        }
        Ok(out)
    }
}
