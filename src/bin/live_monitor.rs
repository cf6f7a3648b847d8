//! Online phase, live: classify every distance the sensor publishes over MQTT.
//!
//! Runs until the broker connection ends or the process is interrupted.
//! Each prediction is printed to stdout whatever the log level. Exits
//! non-zero only when startup fails: bad config, missing or corrupt model,
//! unreachable broker or refused subscription.

use std::process;

use flood_risk_service::config::ServiceConfig;
use flood_risk_service::model::RiskError;
use flood_risk_service::stream::{MqttSource, StreamConsumer};

fn run() -> Result<(), RiskError> {
    let config = ServiceConfig::from_env()?;
    config.logging.init()?;

    let mut consumer = StreamConsumer::new();
    consumer.load_model(&config.artifact.path)?;

    // Blocks until the broker grants the subscription.
    let mut source = MqttSource::connect(&config.mqtt)?;
    consumer.run(&mut source, |result| println!(">>> {}", result))?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("live_monitor: {}", e);
        process::exit(1);
    }
}
