//! Online phase, simulated: classify random distances every few seconds.
//!
//! Runs until interrupted (or until `simulation.max_readings` is reached).
//! Each prediction is printed to stdout whatever the log level. Exits
//! non-zero only when startup fails.

use std::process;

use flood_risk_service::config::ServiceConfig;
use flood_risk_service::logging::{self, Component};
use flood_risk_service::model::RiskError;
use flood_risk_service::stream::{SimulatedSource, StreamConsumer};

fn run() -> Result<(), RiskError> {
    let config = ServiceConfig::from_env()?;
    config.logging.init()?;

    let mut consumer = StreamConsumer::new();
    consumer.load_model(&config.artifact.path)?;

    let mut source = SimulatedSource::new(&config.simulation)?;
    logging::info(
        Component::Simulator,
        &format!(
            "Simulating readings in [{}, {}) cm every {}s",
            config.simulation.low, config.simulation.high, config.simulation.interval_secs
        ),
    );
    consumer.run(&mut source, |result| println!(">>> {}", result))?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("simulate_monitor: {}", e);
        process::exit(1);
    }
}
