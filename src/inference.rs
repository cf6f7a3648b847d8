/// Single-reading inference shared by the live and simulated monitors.
///
/// Everything here is a pure function of the classifier and the reading.
/// Each monitor owns its own loaded `DecisionTree` and passes it in
/// explicitly; there is no process-wide "current model".

use crate::model::{PredictionResult, RiskError, RiskLevel, UNKNOWN_LABEL};
use crate::training::DecisionTree;

/// Maps a reading to a risk level.
///
/// Any finite distance is accepted. Readings outside the training bands
/// land in whichever boundary region they fall into; that extrapolation is
/// not flagged.
pub fn predict(classifier: &DecisionTree, distance_cm: f64) -> Result<RiskLevel, RiskError> {
    if !distance_cm.is_finite() {
        return Err(RiskError::PredictionError(format!(
            "reading {} is not a finite distance",
            distance_cm
        )));
    }
    classifier.decide(distance_cm)
}

/// Display label for a numeric level code. Total: codes outside the
/// table map to `"Unknown"`.
pub fn label_of(code: i64) -> &'static str {
    RiskLevel::from_code(code).map_or(UNKNOWN_LABEL, RiskLevel::label)
}

/// `predict` plus the display label, bundled for output.
pub fn classify(classifier: &DecisionTree, distance_cm: f64) -> Result<PredictionResult, RiskError> {
    let level = predict(classifier, distance_cm)?;
    Ok(PredictionResult {
        distance_cm,
        level,
        label: label_of(level.code() as i64),
    })
}
