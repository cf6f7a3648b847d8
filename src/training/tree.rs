/// Depth-limited decision tree on the single distance feature.
///
/// The tree is grown greedily with Gini impurity. Every candidate threshold
/// is the midpoint between two consecutive distinct training distances;
/// readings `<= threshold` go left. Growth stops at `max_depth`, at a pure
/// node, or when all remaining distances are equal.
///
/// Nodes live in a flat arena with every parent stored before its children,
/// which is also the serialized form kept in the model artifact.

use serde::{Deserialize, Serialize};

use crate::model::{LabeledSample, RiskError, RiskLevel};

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        level: RiskLevel,
        /// Training samples per level that reached this leaf.
        counts: [usize; 3],
    },
}

/// A fitted classifier: `distance_cm -> RiskLevel`.
///
/// Immutable after construction. Instances only come from `fit` or from
/// `from_nodes`, which validates the node graph.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    max_depth: usize,
}

impl DecisionTree {
    /// Fits a tree to `samples` with at most `max_depth` split levels.
    pub fn fit(samples: &[LabeledSample], max_depth: usize) -> Result<DecisionTree, RiskError> {
        if samples.is_empty() {
            return Err(RiskError::DataError("cannot fit a tree to zero samples".to_string()));
        }
        if let Some(bad) = samples.iter().find(|s| !s.distance_cm.is_finite()) {
            return Err(RiskError::DataError(format!(
                "non-finite training distance {}",
                bad.distance_cm
            )));
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.distance_cm.total_cmp(&b.distance_cm));

        let mut tree = DecisionTree { nodes: Vec::new(), max_depth };
        tree.grow(&sorted, 0);
        Ok(tree)
    }

    /// Rebuilds a tree from a stored node table, rejecting anything that
    /// is not a well-formed tree of depth `<= max_depth`.
    pub fn from_nodes(nodes: Vec<TreeNode>, max_depth: usize) -> Result<DecisionTree, String> {
        if nodes.is_empty() {
            return Err("node table is empty".to_string());
        }

        let mut depth = vec![None; nodes.len()];
        depth[0] = Some(0usize);
        for (i, node) in nodes.iter().enumerate() {
            let node_depth = depth[i].ok_or_else(|| format!("node {} is unreachable from the root", i))?;
            if let TreeNode::Split { threshold, left, right } = *node {
                if !threshold.is_finite() {
                    return Err(format!("node {} has non-finite threshold {}", i, threshold));
                }
                if node_depth >= max_depth {
                    return Err(format!("node {} splits below the maximum depth {}", i, max_depth));
                }
                for child in [left, right] {
                    if child <= i || child >= nodes.len() {
                        return Err(format!("node {} has invalid child index {}", i, child));
                    }
                    if depth[child].is_some() {
                        return Err(format!("node {} is referenced by more than one parent", child));
                    }
                    depth[child] = Some(node_depth + 1);
                }
            }
        }

        Ok(DecisionTree { nodes, max_depth })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth actually reached (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut deepest = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = *node {
                depth[left] = depth[i] + 1;
                depth[right] = depth[i] + 1;
                deepest = deepest.max(depth[i] + 1);
            }
        }
        deepest
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, TreeNode::Leaf { .. })).count()
    }

    /// Split thresholds in ascending order.
    pub fn thresholds(&self) -> Vec<f64> {
        let mut thresholds: Vec<f64> = self
            .nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Split { threshold, .. } => Some(*threshold),
                TreeNode::Leaf { .. } => None,
            })
            .collect();
        thresholds.sort_by(f64::total_cmp);
        thresholds
    }

    /// Walks the tree for one distance.
    pub fn decide(&self, distance_cm: f64) -> Result<RiskLevel, RiskError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { level, .. }) => return Ok(*level),
                Some(TreeNode::Split { threshold, left, right }) => {
                    index = if distance_cm <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(RiskError::PredictionError(format!(
                        "tree has no node {}",
                        index
                    )));
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Growing
    // -----------------------------------------------------------------------

    /// Appends the subtree for `samples` (sorted by distance) and returns
    /// the index of its root.
    fn grow(&mut self, samples: &[LabeledSample], depth: usize) -> usize {
        let counts = class_counts(samples);
        let index = self.nodes.len();
        self.nodes.push(leaf(counts));

        if depth >= self.max_depth || is_pure(&counts) {
            return index;
        }
        let Some((cut, threshold)) = best_split(samples) else {
            return index;
        };

        let left = self.grow(&samples[..cut], depth + 1);
        let right = self.grow(&samples[cut..], depth + 1);
        self.nodes[index] = TreeNode::Split { threshold, left, right };
        index
    }
}

fn leaf(counts: [usize; 3]) -> TreeNode {
    // max_by_key keeps the last maximum; iterate in reverse so ties go to
    // the lower code.
    let level = RiskLevel::ALL
        .into_iter()
        .rev()
        .max_by_key(|level| counts[level.index()])
        .unwrap_or(RiskLevel::Normal);
    TreeNode::Leaf { level, counts }
}

fn class_counts(samples: &[LabeledSample]) -> [usize; 3] {
    let mut counts = [0; 3];
    for sample in samples {
        counts[sample.level.index()] += 1;
    }
    counts
}

fn is_pure(counts: &[usize; 3]) -> bool {
    counts.iter().filter(|&&c| c > 0).count() <= 1
}

fn gini(counts: &[usize; 3], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / total).powi(2)).sum::<f64>()
}

/// Finds the cut position and threshold with the lowest weighted Gini
/// impurity. `samples` must be sorted by distance. Returns `None` when all
/// distances are equal.
fn best_split(samples: &[LabeledSample]) -> Option<(usize, f64)> {
    let n = samples.len();
    let total = class_counts(samples);
    let mut left = [0usize; 3];
    let mut best: Option<(usize, f64, f64)> = None;

    for cut in 1..n {
        left[samples[cut - 1].level.index()] += 1;

        let lo = samples[cut - 1].distance_cm;
        let hi = samples[cut].distance_cm;
        if lo >= hi {
            continue;
        }

        let right = [total[0] - left[0], total[1] - left[1], total[2] - left[2]];
        let impurity = (cut as f64 * gini(&left, cut) + (n - cut) as f64 * gini(&right, n - cut))
            / n as f64;

        if best.is_none_or(|(_, _, b)| impurity < b) {
            let mut threshold = lo + (hi - lo) / 2.0;
            // Adjacent floats can round the midpoint up onto `hi`.
            if threshold >= hi {
                threshold = lo;
            }
            best = Some((cut, threshold, impurity));
        }
    }

    best.map(|(cut, threshold, _)| (cut, threshold))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(distance_cm: f64, level: RiskLevel) -> LabeledSample {
        LabeledSample { distance_cm, level }
    }

    fn three_band_samples() -> Vec<LabeledSample> {
        vec![
            sample(90.0, RiskLevel::Normal),
            sample(70.0, RiskLevel::Normal),
            sample(55.0, RiskLevel::Normal),
            sample(45.0, RiskLevel::Alert),
            sample(30.0, RiskLevel::Alert),
            sample(15.0, RiskLevel::Flood),
            sample(8.0, RiskLevel::Flood),
        ]
    }

    #[test]
    fn test_fit_separates_three_bands_with_two_thresholds() {
        let tree = DecisionTree::fit(&three_band_samples(), 3).unwrap();
        assert_eq!(tree.thresholds(), vec![22.5, 50.0]);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_decide_follows_learned_boundaries() {
        let tree = DecisionTree::fit(&three_band_samples(), 3).unwrap();
        assert_eq!(tree.decide(80.0).unwrap(), RiskLevel::Normal);
        assert_eq!(tree.decide(35.0).unwrap(), RiskLevel::Alert);
        assert_eq!(tree.decide(10.0).unwrap(), RiskLevel::Flood);
        // Exactly on a threshold goes left (the lower-distance side).
        assert_eq!(tree.decide(50.0).unwrap(), RiskLevel::Alert);
    }

    #[test]
    fn test_out_of_band_readings_fall_into_edge_regions() {
        let tree = DecisionTree::fit(&three_band_samples(), 3).unwrap();
        assert_eq!(tree.decide(500.0).unwrap(), RiskLevel::Normal);
        assert_eq!(tree.decide(-3.0).unwrap(), RiskLevel::Flood);
    }

    #[test]
    fn test_depth_limit_is_respected() {
        let tree = DecisionTree::fit(&three_band_samples(), 1).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);

        let stump = DecisionTree::fit(&three_band_samples(), 0).unwrap();
        assert_eq!(stump.nodes().len(), 1);
        assert_eq!(stump.decide(10.0).unwrap(), RiskLevel::Normal, "majority class");
    }

    #[test]
    fn test_pure_input_yields_single_leaf() {
        let samples = vec![sample(60.0, RiskLevel::Normal), sample(70.0, RiskLevel::Normal)];
        let tree = DecisionTree::fit(&samples, 3).unwrap();
        assert_eq!(tree.nodes().len(), 1);
    }

    #[test]
    fn test_identical_distances_cannot_be_split() {
        let samples = vec![sample(30.0, RiskLevel::Alert), sample(30.0, RiskLevel::Flood)];
        let tree = DecisionTree::fit(&samples, 3).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.decide(30.0).unwrap(), RiskLevel::Alert, "tie goes to the lower code");
    }

    #[test]
    fn test_fit_rejects_empty_and_non_finite_input() {
        assert!(matches!(DecisionTree::fit(&[], 3), Err(RiskError::DataError(_))));
        let bad = vec![sample(f64::NAN, RiskLevel::Alert)];
        assert!(matches!(DecisionTree::fit(&bad, 3), Err(RiskError::DataError(_))));
    }

    #[test]
    fn test_from_nodes_accepts_fitted_node_table() {
        let tree = DecisionTree::fit(&three_band_samples(), 3).unwrap();
        let rebuilt = DecisionTree::from_nodes(tree.nodes().to_vec(), 3).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn test_from_nodes_rejects_backward_child_reference() {
        let nodes = vec![
            TreeNode::Split { threshold: 50.0, left: 0, right: 1 },
            TreeNode::Leaf { level: RiskLevel::Normal, counts: [1, 0, 0] },
        ];
        let err = DecisionTree::from_nodes(nodes, 3).unwrap_err();
        assert!(err.contains("invalid child"), "unexpected error: {}", err);
    }

    #[test]
    fn test_from_nodes_rejects_out_of_range_child_and_orphans() {
        let dangling = vec![
            TreeNode::Split { threshold: 50.0, left: 1, right: 5 },
            TreeNode::Leaf { level: RiskLevel::Normal, counts: [1, 0, 0] },
        ];
        assert!(DecisionTree::from_nodes(dangling, 3).is_err());

        let orphan = vec![
            TreeNode::Leaf { level: RiskLevel::Normal, counts: [1, 0, 0] },
            TreeNode::Leaf { level: RiskLevel::Flood, counts: [0, 0, 1] },
        ];
        assert!(DecisionTree::from_nodes(orphan, 3).is_err());
    }

    #[test]
    fn test_from_nodes_rejects_tree_deeper_than_declared() {
        let tree = DecisionTree::fit(&three_band_samples(), 3).unwrap();
        assert!(DecisionTree::from_nodes(tree.nodes().to_vec(), 1).is_err());
    }

    #[test]
    fn test_from_nodes_rejects_nan_threshold() {
        let nodes = vec![
            TreeNode::Split { threshold: f64::NAN, left: 1, right: 2 },
            TreeNode::Leaf { level: RiskLevel::Alert, counts: [0, 1, 0] },
            TreeNode::Leaf { level: RiskLevel::Normal, counts: [1, 0, 0] },
        ];
        assert!(DecisionTree::from_nodes(nodes, 3).is_err());
    }
}
