//! Tree Ensemble
//!
//! Flat-array decision trees as exported by common gradient boosting and
//! random forest toolkits. Node 0 is the root; a split sends `x[feature] <=
//! threshold` left. Every node records its training cover so expectations
//! over unknown features can be taken without the training data.

use serde::{Deserialize, Serialize};

use crate::logic::features::FEATURE_COUNT;

// ============================================================================
// NODES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        /// One value per ensemble class
        value: Vec<f64>,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let len = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            let cover = node.cover();
            if !cover.is_finite() || cover < 0.0 {
                return Err(format!("node {} has invalid cover", index));
            }
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {} splits on unknown feature {}", index, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has non-finite threshold", index));
                    }
                    // Children after parent keeps every walk finite
                    for child in [*left, *right] {
                        if child <= index || child >= len {
                            return Err(format!("node {} has invalid child {}", index, child));
                        }
                    }
                }
                TreeNode::Leaf { value, .. } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} values, expected {}",
                            index,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite()) {
                        return Err(format!("leaf {} has non-finite values", index));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf values reached by `x`
    fn leaf(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value, .. } => return value,
            }
        }
    }

    /// Expected leaf value for `class` when only the features in `known`
    /// (bitmask over the layout) are observed. Unknown splits average their
    /// children weighted by training cover.
    fn expected(&self, x: &[f64; FEATURE_COUNT], known: u16, class: usize, index: usize) -> f64 {
        match &self.nodes[index] {
            TreeNode::Leaf { value, .. } => value[class],
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if known & (1u16 << *feature) != 0 {
                    let next = if x[*feature] <= *threshold { *left } else { *right };
                    self.expected(x, known, class, next)
                } else {
                    let left_cover = self.nodes[*left].cover();
                    let right_cover = self.nodes[*right].cover();
                    let left_value = self.expected(x, known, class, *left);
                    let right_value = self.expected(x, known, class, *right);
                    let total = left_cover + right_cover;
                    if total > 0.0 {
                        (left_cover * left_value + right_cover * right_value) / total
                    } else {
                        (left_value + right_value) / 2.0
                    }
                }
            }
        }
    }
}

// ============================================================================
// ENSEMBLE
// ============================================================================

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Mean of per-class leaf probabilities (random forest)
    Average,
    /// Sum of per-class leaf margins, softmax on top (gradient boosting)
    Sum,
}

impl Aggregation {
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Aggregation::Average => "random_forest",
            Aggregation::Sum => "gradient_boosting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_classes: usize,
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: Vec<f64>,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Build and validate
    pub fn new(
        n_classes: usize,
        aggregation: Aggregation,
        base_score: Vec<f64>,
        trees: Vec<DecisionTree>,
    ) -> Result<Self, String> {
        let ensemble = Self {
            n_classes,
            aggregation,
            base_score,
            trees,
        };
        ensemble.validate()?;
        Ok(ensemble)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.n_classes < 2 {
            return Err("ensemble needs at least two classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if !self.base_score.is_empty() && self.base_score.len() != self.n_classes {
            return Err(format!(
                "base score has {} values, expected {}",
                self.base_score.len(),
                self.n_classes
            ));
        }
        if self.base_score.iter().any(|v| !v.is_finite()) {
            return Err("base score has non-finite values".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn base(&self, class: usize) -> f64 {
        self.base_score.get(class).copied().unwrap_or(0.0)
    }

    fn aggregate(&self, class: usize, sum: f64) -> f64 {
        match self.aggregation {
            Aggregation::Average => self.base(class) + sum / self.trees.len() as f64,
            Aggregation::Sum => self.base(class) + sum,
        }
    }

    /// Raw per-class output (averaged probabilities or summed margins).
    /// Only valid on a validated ensemble.
    pub(crate) fn raw_scores(&self, x: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (sum, value) in sums.iter_mut().zip(tree.leaf(x)) {
                *sum += value;
            }
        }
        sums.into_iter()
            .enumerate()
            .map(|(class, sum)| self.aggregate(class, sum))
            .collect()
    }

    /// Raw output for `class` with only the `known` features observed.
    /// With every feature known this equals `raw_scores(x)[class]`.
    pub(crate) fn expected_raw(&self, x: &[f64; FEATURE_COUNT], known: u16, class: usize) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.expected(x, known, class, 0))
            .sum();
        self.aggregate(class, sum)
    }

    /// Uncalibrated class probabilities from raw output
    pub(crate) fn probabilities(&self, raw: &[f64]) -> Vec<f64> {
        match self.aggregation {
            Aggregation::Average => {
                let clamped: Vec<f64> = raw.iter().map(|v| v.max(0.0)).collect();
                normalize(clamped)
            }
            Aggregation::Sum => softmax(raw),
        }
    }
}

/// Scale to sum 1.0; uniform when the mass is zero
pub(crate) fn normalize(values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 && total.is_finite() {
        values.into_iter().map(|v| v / total).collect()
    } else {
        let n = values.len().max(1) as f64;
        values.iter().map(|_| 1.0 / n).collect()
    }
}

pub(crate) fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    normalize(exps)
}
