/// Synthetic reading source for demos without a sensor.
///
/// Readings are drawn uniformly from `[low, high)` with an entropy-seeded
/// generator, so every run differs. After each reading the source sleeps
/// for `interval` before producing the next one.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::logging::Component;
use crate::model::RiskError;
use crate::stream::ReadingSource;

pub struct SimulatedSource {
    rng: StdRng,
    low: f64,
    high: f64,
    interval: Duration,
    max_readings: Option<u64>,
    emitted: u64,
}

impl SimulatedSource {
    pub fn new(config: &SimulationConfig) -> Result<Self, RiskError> {
        if !(config.low.is_finite() && config.high.is_finite() && config.low < config.high) {
            return Err(RiskError::ConfigError(format!(
                "simulation range [{}, {}) is empty",
                config.low, config.high
            )));
        }
        Ok(Self {
            rng: StdRng::from_entropy(),
            low: config.low,
            high: config.high,
            interval: config.interval(),
            max_readings: config.max_readings,
            emitted: 0,
        })
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl ReadingSource for SimulatedSource {
    fn component(&self) -> Component {
        Component::Simulator
    }

    fn next_reading(&mut self) -> Option<Result<f64, RiskError>> {
        if self.max_readings.is_some_and(|max| self.emitted >= max) {
            return None;
        }
        if self.emitted > 0 {
            thread::sleep(self.interval);
        }
        self.emitted += 1;
        Some(Ok(self.rng.gen_range(self.low..self.high)))
    }
}
