/// Model artifact store.
///
/// The artifact is the only hand-off between the training binary and the
/// monitors. It is a self-describing JSON document holding the fitted
/// decision boundaries, never the training data:
///
/// ```json
/// {
///   "format": "flood-risk-tree",
///   "version": 1,
///   "feature": "distancia_cm",
///   "trained_at": "2024-05-01T13:00:00Z",
///   "max_depth": 3,
///   "nodes": [
///     { "kind": "split", "threshold": 49.97, "left": 1, "right": 4 },
///     { "kind": "leaf", "level": 0, "counts": [240, 0, 0] }
///   ]
/// }
/// ```
///
/// Loading never falls back to a default classifier: a missing file is
/// `ArtifactNotFound`, anything unparseable or structurally invalid is
/// `ArtifactCorrupt`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{FEATURE_NAME, RiskError};
use crate::training::{DecisionTree, TreeNode};

/// Default artifact file name, relative to the working directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "flood_risk_model.json";

const FORMAT_TAG: &str = "flood-risk-tree";
const FORMAT_VERSION: u32 = 1;

/// On-disk representation of a fitted classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub version: u32,
    pub feature: String,
    pub trained_at: DateTime<Utc>,
    pub max_depth: usize,
    pub nodes: Vec<TreeNode>,
}

impl ModelArtifact {
    pub fn from_classifier(classifier: &DecisionTree, trained_at: DateTime<Utc>) -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            feature: FEATURE_NAME.to_string(),
            trained_at,
            max_depth: classifier.max_depth(),
            nodes: classifier.nodes().to_vec(),
        }
    }

    /// Checks the header and rebuilds the tree.
    pub fn into_classifier(self) -> Result<DecisionTree, RiskError> {
        if self.format != FORMAT_TAG {
            return Err(RiskError::ArtifactCorrupt(format!(
                "unexpected format tag '{}'",
                self.format
            )));
        }
        if self.version != FORMAT_VERSION {
            return Err(RiskError::ArtifactCorrupt(format!(
                "unsupported format version {}",
                self.version
            )));
        }
        if self.feature != FEATURE_NAME {
            return Err(RiskError::ArtifactCorrupt(format!(
                "model was trained on feature '{}', expected '{}'",
                self.feature, FEATURE_NAME
            )));
        }
        DecisionTree::from_nodes(self.nodes, self.max_depth).map_err(RiskError::ArtifactCorrupt)
    }
}

/// Serializes `classifier` to `path`, replacing any existing artifact.
pub fn save(classifier: &DecisionTree, path: &Path) -> Result<(), RiskError> {
    let artifact = ModelArtifact::from_classifier(classifier, Utc::now());
    let json = serde_json::to_string_pretty(&artifact)
        .map_err(|e| RiskError::ArtifactWrite(format!("cannot serialize model: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| RiskError::ArtifactWrite(format!("cannot write {}: {}", path.display(), e)))
}

/// Reads the artifact at `path` back into a classifier.
pub fn load(path: &Path) -> Result<DecisionTree, RiskError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RiskError::ArtifactNotFound(path.display().to_string()),
        _ => RiskError::ArtifactCorrupt(format!("cannot read {}: {}", path.display(), e)),
    })?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)
        .map_err(|e| RiskError::ArtifactCorrupt(format!("{}: {}", path.display(), e)))?;
    artifact.into_classifier()
}
