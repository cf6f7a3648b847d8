/// Stratified train/test partitioning.
///
/// Each risk level is split on its own so the test partition holds
/// `round(count * test_fraction)` samples of every level. With the default
/// 300/150/50 corpus and a 0.2 fraction that is 60/30/10 test samples, so
/// even the rare Flood class appears on both sides.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::model::{LabeledSample, RiskError, RiskLevel};

/// Train and test partitions of one corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<LabeledSample>,
    pub test: Vec<LabeledSample>,
}

impl Split {
    pub fn count(partition: &[LabeledSample], level: RiskLevel) -> usize {
        partition.iter().filter(|s| s.level == level).count()
    }
}

/// Partitions `corpus` so that every level keeps its proportion in both
/// halves.
///
/// Fails with `InsufficientData` when a level has no samples at all, or
/// when rounding would leave a level absent from either partition.
pub fn stratified_split(
    corpus: &[LabeledSample],
    test_fraction: f64,
    seed: u64,
) -> Result<Split, RiskError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(RiskError::DataError(format!(
            "test fraction must be strictly between 0 and 1, got {}",
            test_fraction
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(corpus.len());
    let mut test = Vec::new();

    for level in RiskLevel::ALL {
        let mut members: Vec<LabeledSample> =
            corpus.iter().copied().filter(|s| s.level == level).collect();
        if members.is_empty() {
            return Err(RiskError::InsufficientData { level, partition: "corpus" });
        }

        let n_test = (members.len() as f64 * test_fraction).round() as usize;
        if n_test == 0 {
            return Err(RiskError::InsufficientData { level, partition: "test" });
        }
        if n_test >= members.len() {
            return Err(RiskError::InsufficientData { level, partition: "train" });
        }

        members.shuffle(&mut rng);
        let rest = members.split_off(n_test);
        test.extend(members);
        train.extend(rest);
    }

    // Mix the levels back together; fitting does not care, but callers
    // slicing the partitions should not see band-ordered blocks.
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(Split { train, test })
}
