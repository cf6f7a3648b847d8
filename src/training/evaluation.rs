/// Held-out evaluation of a fitted tree.
///
/// Accuracy is reported, never enforced: a low score is logged but does not
/// stop the model from being saved.

use std::fmt;

use crate::model::{LabeledSample, RiskError, RiskLevel};
use crate::training::tree::DecisionTree;

/// Rows are the true level, columns the predicted level, both indexed by
/// level code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub cells: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    pub fn record(&mut self, truth: RiskLevel, predicted: RiskLevel) {
        self.cells[truth.index()][predicted.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..3).map(|i| self.cells[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }

    /// Fraction of `level` samples that were predicted as `level`.
    pub fn recall(&self, level: RiskLevel) -> Option<f64> {
        let row = &self.cells[level.index()];
        let support: usize = row.iter().sum();
        (support > 0).then(|| row[level.index()] as f64 / support as f64)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "true\\pred")?;
        for level in RiskLevel::ALL {
            write!(f, " {:>7}", level.label())?;
        }
        for level in RiskLevel::ALL {
            write!(f, "\n{:>9}", level.label())?;
            for count in self.cells[level.index()] {
                write!(f, " {:>7}", count)?;
            }
        }
        Ok(())
    }
}

/// Predicts every test sample and tallies the outcome.
pub fn evaluate(tree: &DecisionTree, test: &[LabeledSample]) -> Result<ConfusionMatrix, RiskError> {
    let mut matrix = ConfusionMatrix::default();
    for sample in test {
        matrix.record(sample.level, tree.decide(sample.distance_cm)?);
    }
    Ok(matrix)
}
