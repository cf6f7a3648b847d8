/// Integration tests for the offline → online hand-off
///
/// Tests verify:
/// 1. Seeded generation + training reaches the expected held-out accuracy
/// 2. The saved artifact reloads into a functionally identical predictor
/// 3. Representative readings map to the expected risk levels
/// 4. A monitor refuses to start without a usable artifact
///
/// No network or external services required.

use flood_risk_service::artifact;
use flood_risk_service::dataset::{self, CorpusSpec};
use flood_risk_service::inference::{classify, label_of, predict};
use flood_risk_service::model::{RiskError, RiskLevel};
use flood_risk_service::stream::{ConsumerState, StreamConsumer};
use flood_risk_service::training::{self, DecisionTree, TrainingParams};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn trained_default() -> training::TrainingReport {
    let corpus = dataset::generate(42, &CorpusSpec::default()).expect("default spec is valid");
    training::train(&corpus, &TrainingParams::default()).expect("default corpus trains")
}

/// Readings spread across and beyond the training bands.
fn probe_readings() -> Vec<f64> {
    let mut readings: Vec<f64> = (0..=220).map(|i| i as f64 * 0.5).collect();
    readings.extend([-10.0, 0.0, 19.99, 20.0, 20.01, 49.99, 50.0, 50.01, 250.0, 1e6]);
    readings
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

#[test]
fn test_seed_42_default_corpus_scores_at_least_95_percent() {
    let report = trained_default();
    assert!(
        report.held_out_accuracy >= 0.95,
        "held-out accuracy {:.3} below 0.95\n{}",
        report.held_out_accuracy,
        report.confusion
    );
}

#[test]
fn test_every_level_is_recalled_on_the_held_out_set() {
    let report = trained_default();
    for level in RiskLevel::ALL {
        let recall = report.confusion.recall(level).expect("every level is in the test set");
        assert!(recall >= 0.8, "{} recall {:.2} is too low", level, recall);
    }
}

#[test]
fn test_tree_stays_within_depth_budget() {
    let report = trained_default();
    assert!(report.classifier.depth() <= 3);
    assert!(report.classifier.n_leaves() >= 3, "three levels need at least three leaves");
}

// ---------------------------------------------------------------------------
// Artifact round trip
// ---------------------------------------------------------------------------

#[test]
fn test_reloaded_model_predicts_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flood_risk_model.json");
    let original = trained_default().classifier;

    artifact::save(&original, &path).expect("save should succeed");
    let reloaded = artifact::load(&path).expect("load should succeed");

    for reading in probe_readings() {
        assert_eq!(
            predict(&original, reading).unwrap(),
            predict(&reloaded, reading).unwrap(),
            "prediction differs after reload for {}",
            reading
        );
    }
}

#[test]
fn test_models_trained_with_other_seeds_also_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for seed in [1u64, 7, 123] {
        let corpus = dataset::generate(seed, &CorpusSpec::default()).unwrap();
        let params = TrainingParams { seed, ..TrainingParams::default() };
        let tree: DecisionTree = training::train(&corpus, &params).unwrap().classifier;
        let path = dir.path().join(format!("model_{}.json", seed));
        artifact::save(&tree, &path).unwrap();
        assert_eq!(artifact::load(&path).unwrap(), tree, "seed {}", seed);
    }
}

// ---------------------------------------------------------------------------
// Inference scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_representative_readings_map_to_expected_levels() {
    let tree = trained_default().classifier;

    let normal = classify(&tree, 80.0).unwrap();
    assert_eq!((normal.level, normal.code(), normal.label), (RiskLevel::Normal, 0, "Normal"));

    let alert = classify(&tree, 35.0).unwrap();
    assert_eq!((alert.level, alert.code(), alert.label), (RiskLevel::Alert, 1, "Alert"));

    let flood = classify(&tree, 10.0).unwrap();
    assert_eq!((flood.level, flood.code(), flood.label), (RiskLevel::Flood, 2, "Flood"));
}

#[test]
fn test_predictions_are_monotonic_in_distance() {
    // Closer water never means lower risk.
    let tree = trained_default().classifier;
    let mut previous = RiskLevel::Flood;
    for reading in (0..=120).map(|i| i as f64) {
        let level = predict(&tree, reading).unwrap();
        assert!(level <= previous, "risk rose from {} to {} at {} cm", previous, level, reading);
        previous = level;
    }
}

#[test]
fn test_label_table_boundaries() {
    assert_eq!(label_of(0), "Normal");
    assert_eq!(label_of(1), "Alert");
    assert_eq!(label_of(2), "Flood");
    assert_eq!(label_of(5), "Unknown");
}

// ---------------------------------------------------------------------------
// Startup failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_artifact_blocks_monitor_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut consumer = StreamConsumer::new();

    let err = consumer
        .load_model(&dir.path().join("flood_risk_model.json"))
        .expect_err("missing artifact must fail");
    assert!(matches!(err, RiskError::ArtifactNotFound(_)), "got {:?}", err);
    assert!(err.to_string().contains("Artifact not found"));

    assert_eq!(consumer.state(), ConsumerState::Idle);
    assert!(consumer.begin().is_err(), "consumer must not enter Running");
    assert_eq!(consumer.state(), ConsumerState::Idle);
}

#[test]
fn test_corrupt_artifact_blocks_monitor_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flood_risk_model.json");
    std::fs::write(&path, "{ \"format\": \"flood-risk-tree\" }").unwrap();

    let mut consumer = StreamConsumer::new();
    let err = consumer.load_model(&path).unwrap_err();
    assert!(matches!(err, RiskError::ArtifactCorrupt(_)), "got {:?}", err);
    assert_eq!(consumer.state(), ConsumerState::Idle);
}
