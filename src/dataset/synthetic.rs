/// Synthetic corpus generation.
///
/// Simulates ultrasonic distance readings (cm) for each risk level by
/// drawing uniformly from a per-level band, then shuffling the whole corpus.
/// Smaller distance means higher water, so the Flood band sits lowest.
///
/// # Determinism
/// All randomness comes from `StdRng::seed_from_u64(seed)`. The same seed
/// and `CorpusSpec` always produce the same corpus in the same order, which keeps
/// the reported held-out accuracy reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{Corpus, LabeledSample, RiskError, RiskLevel};

// ---------------------------------------------------------------------------
// Band definitions
// ---------------------------------------------------------------------------

/// Half-open distance interval `[low, high)` assigned to one risk level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub level: RiskLevel,
    pub low: f64,
    pub high: f64,
    pub count: usize,
}

impl Band {
    pub fn contains(&self, distance_cm: f64) -> bool {
        distance_cm >= self.low && distance_cm < self.high
    }

    fn overlaps(&self, other: &Band) -> bool {
        self.low < other.high && other.low < self.high
    }
}

/// Per-level bands and sample counts for one corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSpec {
    pub bands: Vec<Band>,
}

impl Default for CorpusSpec {
    /// 300 / 150 / 50 samples (6:3:1) over [50,100), [20,50), [5,20).
    fn default() -> Self {
        Self {
            bands: vec![
                Band { level: RiskLevel::Normal, low: 50.0, high: 100.0, count: 300 },
                Band { level: RiskLevel::Alert, low: 20.0, high: 50.0, count: 150 },
                Band { level: RiskLevel::Flood, low: 5.0, high: 20.0, count: 50 },
            ],
        }
    }
}

impl CorpusSpec {
    pub fn total_samples(&self) -> usize {
        self.bands.iter().map(|b| b.count).sum()
    }

    pub fn band_for(&self, level: RiskLevel) -> Option<&Band> {
        self.bands.iter().find(|b| b.level == level)
    }

    /// Checks that every band is well-formed (finite, low < high), that no
    /// level appears twice, and that no two bands overlap.
    pub fn validate(&self) -> Result<(), RiskError> {
        for (i, band) in self.bands.iter().enumerate() {
            if !band.low.is_finite() || !band.high.is_finite() {
                return Err(RiskError::DataError(format!(
                    "{} band has non-finite bounds [{}, {})",
                    band.level, band.low, band.high
                )));
            }
            if band.low >= band.high {
                return Err(RiskError::DataError(format!(
                    "{} band is empty: low {} is not below high {}",
                    band.level, band.low, band.high
                )));
            }
            for other in &self.bands[i + 1..] {
                if other.level == band.level {
                    return Err(RiskError::DataError(format!(
                        "{} band is defined more than once",
                        band.level
                    )));
                }
                if band.overlaps(other) {
                    return Err(RiskError::DataError(format!(
                        "{} band [{}, {}) overlaps {} band [{}, {})",
                        band.level, band.low, band.high, other.level, other.low, other.high
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates a labeled corpus: each band is sampled independently and
/// uniformly, the bands are concatenated in `CorpusSpec` order, and the result is
/// shuffled once with a generator keyed by the same seed.
pub fn generate(seed: u64, spec: &CorpusSpec) -> Result<Corpus, RiskError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut corpus = Vec::with_capacity(spec.total_samples());

    for band in &spec.bands {
        corpus.extend((0..band.count).map(|_| LabeledSample {
            distance_cm: rng.gen_range(band.low..band.high),
            level: band.level,
        }));
    }

    let mut shuffle_rng = StdRng::seed_from_u64(seed);
    corpus.shuffle(&mut shuffle_rng);

    Ok(corpus)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
