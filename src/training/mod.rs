/// Offline training of the boundary classifier.
///
/// Submodules:
/// - `split` — stratified train/test partitioning.
/// - `tree` — depth-limited Gini decision tree on the distance feature.
/// - `evaluation` — held-out accuracy and confusion matrix.

pub mod evaluation;
pub mod split;
pub mod tree;

use serde::{Deserialize, Serialize};

use crate::model::{LabeledSample, RiskError};

pub use evaluation::{evaluate, ConfusionMatrix};
pub use split::{stratified_split, Split};
pub use tree::{DecisionTree, TreeNode};

/// Knobs for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub test_fraction: f64,
    pub seed: u64,
    pub max_depth: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self { test_fraction: 0.2, seed: 42, max_depth: 3 }
    }
}

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub classifier: DecisionTree,
    pub held_out_accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub train_size: usize,
    pub test_size: usize,
}

/// Splits the corpus, fits the tree on the training partition and scores
/// it on the held-out partition. Nothing is persisted here; a failure
/// leaves no model behind.
pub fn train(corpus: &[LabeledSample], params: &TrainingParams) -> Result<TrainingReport, RiskError> {
    let Split { train, test } = stratified_split(corpus, params.test_fraction, params.seed)?;
    let classifier = DecisionTree::fit(&train, params.max_depth)?;
    let confusion = evaluate(&classifier, &test)?;

    Ok(TrainingReport {
        held_out_accuracy: confusion.accuracy(),
        confusion,
        classifier,
        train_size: train.len(),
        test_size: test.len(),
    })
}
