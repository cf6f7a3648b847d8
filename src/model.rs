/// RiskLevel, LabeledSample, PredictionResult, RiskError
/// core data structures and error handling
///
/// Core data types for the flood risk classification service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond the fixed code/label table, no I/O, and no
/// external dependencies other than serde derives.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feature metadata
// ---------------------------------------------------------------------------

/// Column name of the single feature: ultrasonic distance to the water
/// surface, in centimetres. Smaller distance means higher water.
pub const FEATURE_NAME: &str = "distancia_cm";

/// Column name of the label in the exported dataset.
pub const LABEL_NAME: &str = "nivel_risco";

/// Label returned for any code outside the fixed table.
pub const UNKNOWN_LABEL: &str = "Unknown";

// ---------------------------------------------------------------------------
// Risk levels
// ---------------------------------------------------------------------------

/// Flood risk category, ordered by severity.
///
/// The numeric codes are part of the artifact and CSV formats and must
/// never change: Normal=0, Alert=1, Flood=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLevel {
    Normal,
    Alert,
    Flood,
}

impl RiskLevel {
    /// All levels in ascending severity (and code) order.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Normal, RiskLevel::Alert, RiskLevel::Flood];

    pub fn code(self) -> u8 {
        match self {
            RiskLevel::Normal => 0,
            RiskLevel::Alert => 1,
            RiskLevel::Flood => 2,
        }
    }

    /// Inverse of `code`. Returns `None` for anything outside {0, 1, 2}.
    pub fn from_code(code: i64) -> Option<RiskLevel> {
        match code {
            0 => Some(RiskLevel::Normal),
            1 => Some(RiskLevel::Alert),
            2 => Some(RiskLevel::Flood),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Normal => "Normal",
            RiskLevel::Alert => "Alert",
            RiskLevel::Flood => "Flood",
        }
    }

    /// Position of this level in per-class arrays (`[T; 3]`).
    pub fn index(self) -> usize {
        self.code() as usize
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> u8 {
        level.code()
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        RiskLevel::from_code(code as i64).ok_or_else(|| format!("invalid risk level code {}", code))
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Samples and results
// ---------------------------------------------------------------------------

/// One labeled training example.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub distance_cm: f64,
    pub level: RiskLevel,
}

/// Full labeled dataset. Order carries no meaning after the final shuffle.
pub type Corpus = Vec<LabeledSample>;

/// Outcome of classifying one reading. Produced per reading, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub distance_cm: f64,
    pub level: RiskLevel,
    pub label: &'static str,
}

impl PredictionResult {
    pub fn code(&self) -> u8 {
        self.level.code()
    }
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Predicted risk level: {} (code: {})", self.label, self.code())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise anywhere in the training or monitoring pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Malformed generator bands, an empty class, or an invalid parameter.
    DataError(String),
    /// The stratified split left a class with no samples in one partition.
    InsufficientData { level: RiskLevel, partition: &'static str },
    /// No artifact exists at the given path.
    ArtifactNotFound(String),
    /// The artifact exists but does not describe a valid classifier.
    ArtifactCorrupt(String),
    /// The artifact could not be written.
    ArtifactWrite(String),
    /// A live payload was not a finite decimal number.
    DecodeError(String),
    /// The classifier could not produce a level for a reading.
    PredictionError(String),
    /// A consumer was asked to run from a state other than Ready.
    ConsumerNotReady(String),
    /// The transport refused a connect/subscribe request.
    TransportError(String),
    /// The configuration file or an override could not be parsed.
    ConfigError(String),
}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskError::DataError(msg) => write!(f, "Data error: {}", msg),
            RiskError::InsufficientData { level, partition } => {
                write!(f, "Insufficient data: no {} samples in {} partition", level, partition)
            }
            RiskError::ArtifactNotFound(path) => write!(f, "Artifact not found: {}", path),
            RiskError::ArtifactCorrupt(msg) => write!(f, "Artifact corrupt: {}", msg),
            RiskError::ArtifactWrite(msg) => write!(f, "Artifact write failed: {}", msg),
            RiskError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            RiskError::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            RiskError::ConsumerNotReady(state) => {
                write!(f, "Consumer not ready: cannot start running from state {}", state)
            }
            RiskError::TransportError(msg) => write!(f, "Transport error: {}", msg),
            RiskError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for RiskError {}
