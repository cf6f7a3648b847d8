/// Service configuration.
///
/// Loaded from a TOML file (default `flood_risk.toml`, or the path in
/// `FLOOD_RISK_CONFIG`). Every field has a default, so a missing file runs
/// the service with the built-in settings. A `.env` file is read first and
/// a handful of environment variables override individual fields:
///
/// | Variable                | Field             |
/// |-------------------------|-------------------|
/// | `FLOOD_RISK_MODEL`      | `artifact.path`   |
/// | `FLOOD_RISK_MQTT_HOST`  | `mqtt.host`       |
/// | `FLOOD_RISK_MQTT_PORT`  | `mqtt.port`       |
/// | `FLOOD_RISK_MQTT_TOPIC` | `mqtt.topic`      |
/// | `FLOOD_RISK_LOG_FILE`   | `logging.file`    |

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::artifact::DEFAULT_ARTIFACT_PATH;
use crate::dataset::CorpusSpec;
use crate::logging::LogLevel;
use crate::model::RiskError;
use crate::training::TrainingParams;

pub const DEFAULT_CONFIG_PATH: &str = "flood_risk.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub max_depth: usize,
    /// Audit export of the generated corpus. Empty disables the export.
    pub dataset_csv: String,
    pub corpus: CorpusSpec,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let params = TrainingParams::default();
        Self {
            seed: params.seed,
            test_fraction: params.test_fraction,
            max_depth: params.max_depth,
            dataset_csv: "flood_risk_dataset.csv".to_string(),
            corpus: CorpusSpec::default(),
        }
    }
}

impl TrainingConfig {
    pub fn params(&self) -> TrainingParams {
        TrainingParams {
            test_fraction: self.test_fraction,
            seed: self.seed,
            max_depth: self.max_depth,
        }
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        (!self.dataset_csv.trim().is_empty()).then(|| Path::new(&self.dataset_csv))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_ARTIFACT_PATH) }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub keep_alive_secs: u64,
    pub topic: String,
    pub client_id: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "broker.hivemq.com".to_string(),
            port: 1883,
            keep_alive_secs: 60,
            topic: "esp32/flood/distance".to_string(),
            client_id: "flood-risk-monitor".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub low: f64,
    pub high: f64,
    pub interval_secs: u64,
    /// Stop after this many readings. `None` runs until interrupted.
    pub max_readings: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            low: 5.0,
            high: 100.0,
            interval_secs: 2,
            max_readings: None,
        }
    }
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, RiskError> {
        LogLevel::parse(&self.level)
            .ok_or_else(|| RiskError::ConfigError(format!("unknown log level '{}'", self.level)))
    }

    /// Installs the process-wide logger described by this section.
    pub fn init(&self) -> Result<(), RiskError> {
        crate::logging::init_logger(self.min_level()?, self.file.as_deref(), self.timestamps);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub training: TrainingConfig,
    pub artifact: ArtifactConfig,
    pub mqtt: MqttConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Parses a TOML document.
    pub fn from_toml(text: &str) -> Result<ServiceConfig, RiskError> {
        let config: ServiceConfig =
            toml::from_str(text).map_err(|e| RiskError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`; a file that does not exist yields the defaults.
    pub fn load(path: &Path) -> Result<ServiceConfig, RiskError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ServiceConfig::default()),
            Err(e) => Err(RiskError::ConfigError(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Loads `.env`, the config file, then applies environment overrides.
    pub fn from_env() -> Result<ServiceConfig, RiskError> {
        dotenv::dotenv().ok();
        let path = env::var("FLOOD_RISK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(Path::new(&path))?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Split out from `from_env` so tests need not touch the
    /// process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), RiskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FLOOD_RISK_MODEL") {
            self.artifact.path = PathBuf::from(path);
        }
        if let Some(host) = lookup("FLOOD_RISK_MQTT_HOST") {
            self.mqtt.host = host;
        }
        if let Some(port) = lookup("FLOOD_RISK_MQTT_PORT") {
            self.mqtt.port = port.trim().parse().map_err(|_| {
                RiskError::ConfigError(format!("FLOOD_RISK_MQTT_PORT '{}' is not a port", port))
            })?;
        }
        if let Some(topic) = lookup("FLOOD_RISK_MQTT_TOPIC") {
            self.mqtt.topic = topic;
        }
        if let Some(file) = lookup("FLOOD_RISK_LOG_FILE") {
            self.logging.file = Some(file);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        self.logging.min_level()?;
        let sim = &self.simulation;
        if !(sim.low.is_finite() && sim.high.is_finite() && sim.low < sim.high) {
            return Err(RiskError::ConfigError(format!(
                "simulation range [{}, {}) is empty",
                sim.low, sim.high
            )));
        }
        if self.mqtt.topic.trim().is_empty() {
            return Err(RiskError::ConfigError("mqtt topic is empty".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
