//! Offline phase: synthesize the corpus, train the tree, save the artifact.
//!
//! Exits non-zero if anything fails; no partial model is written.

use std::process;

use flood_risk_service::config::ServiceConfig;
use flood_risk_service::logging::{self, Component};
use flood_risk_service::model::RiskError;
use flood_risk_service::{artifact, dataset, training};

fn run() -> Result<(), RiskError> {
    let config = ServiceConfig::from_env()?;
    config.logging.init()?;
    let training_config = &config.training;

    let corpus = dataset::generate(training_config.seed, &training_config.corpus)?;
    logging::info(
        Component::Dataset,
        &format!("Simulated dataset created: {} samples (seed {})", corpus.len(), training_config.seed),
    );
    if let Some(path) = training_config.dataset_path() {
        dataset::write_csv(&corpus, path)?;
        logging::info(Component::Dataset, &format!("Dataset saved to {}", path.display()));
    }

    let report = training::train(&corpus, &training_config.params())?;
    logging::info(
        Component::Trainer,
        &format!(
            "Model accuracy on the test set: {:.2} ({} train / {} test samples)",
            report.held_out_accuracy, report.train_size, report.test_size
        ),
    );
    logging::debug(Component::Trainer, &format!("Confusion matrix:\n{}", report.confusion));
    logging::debug(
        Component::Trainer,
        &format!("Learned thresholds (cm): {:?}", report.classifier.thresholds()),
    );

    artifact::save(&report.classifier, &config.artifact.path)?;
    logging::info(
        Component::Artifact,
        &format!("Trained model saved to {}", config.artifact.path.display()),
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("train_model: {}", e);
        process::exit(1);
    }
}
