/// Stream consumers: the online half of the service.
///
/// Both monitors share one loop, `StreamConsumer::run`, and differ only in
/// where the next reading comes from (`ReadingSource`):
/// - `live` — MQTT topic subscription, one reading per published payload.
/// - `simulated` — unseeded uniform readings with a fixed pause between them.
///
/// Lifecycle: `Idle -> Ready` once a model is loaded, `Ready -> Running`
/// when the loop starts, `Running -> Stopped` when the source closes. A
/// consumer whose model failed to load stays `Idle` and refuses to run.
///
/// A bad payload or a failed prediction drops that one reading; the loop
/// keeps going. Nothing is retried.

pub mod live;
pub mod simulated;

use std::fmt;
use std::path::Path;

use crate::artifact;
use crate::inference;
use crate::logging::{self, Component};
use crate::model::{PredictionResult, RiskError};
use crate::training::DecisionTree;

pub use live::MqttSource;
pub use simulated::SimulatedSource;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where readings come from. The only point of variation between monitors.
pub trait ReadingSource {
    /// Component tag used when logging on behalf of this source.
    fn component(&self) -> Component;

    /// Blocks until the next reading is available.
    ///
    /// `Some(Err(_))` is a single bad reading (dropped by the consumer);
    /// `None` means the source is closed and the consumer should stop.
    fn next_reading(&mut self) -> Option<Result<f64, RiskError>>;
}

/// Decodes a payload carrying a UTF-8 decimal number, e.g. `b"42.7"`.
/// Surrounding whitespace is ignored.
pub fn decode_payload(payload: &[u8]) -> Result<f64, RiskError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| RiskError::DecodeError(format!("payload is not UTF-8: {:?}", payload)))?;
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| RiskError::DecodeError(format!("payload '{}' is not a number", text.trim())))?;
    if !value.is_finite() {
        return Err(RiskError::DecodeError(format!("payload '{}' is not finite", text.trim())));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Idle,
    Ready,
    Running,
    Stopped,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumerState::Idle => write!(f, "Idle"),
            ConsumerState::Ready => write!(f, "Ready"),
            ConsumerState::Running => write!(f, "Running"),
            ConsumerState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Per-run tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub processed: u64,
    pub dropped: u64,
}

/// Owns one loaded classifier and drives readings through it.
pub struct StreamConsumer {
    state: ConsumerState,
    classifier: Option<DecisionTree>,
    stats: StreamStats,
}

impl Default for StreamConsumer {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamConsumer {
    /// A consumer with no model, in `Idle`.
    pub fn new() -> Self {
        Self {
            state: ConsumerState::Idle,
            classifier: None,
            stats: StreamStats::default(),
        }
    }

    /// A consumer around an already-loaded classifier, in `Ready`.
    pub fn with_classifier(classifier: DecisionTree) -> Self {
        Self {
            state: ConsumerState::Ready,
            classifier: Some(classifier),
            stats: StreamStats::default(),
        }
    }

    /// Loads the artifact at `path`. On success moves to `Ready`; on
    /// failure stays `Idle` and returns the load error.
    pub fn load_model(&mut self, path: &Path) -> Result<(), RiskError> {
        if self.state != ConsumerState::Idle {
            return Err(RiskError::ConsumerNotReady(self.state.to_string()));
        }
        let classifier = artifact::load(path)?;
        logging::info(Component::Artifact, &format!("Model loaded from {}", path.display()));
        self.classifier = Some(classifier);
        self.state = ConsumerState::Ready;
        Ok(())
    }

    pub fn state(&self) -> ConsumerState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// `Ready -> Running`. Any other starting state is refused.
    pub fn begin(&mut self) -> Result<(), RiskError> {
        if self.state != ConsumerState::Ready || self.classifier.is_none() {
            return Err(RiskError::ConsumerNotReady(self.state.to_string()));
        }
        self.state = ConsumerState::Running;
        Ok(())
    }

    /// Handles one item from a source. Returns the prediction, or `None`
    /// when the reading was dropped. The consumer stays `Running` either way.
    pub fn process(
        &mut self,
        component: Component,
        reading: Result<f64, RiskError>,
    ) -> Option<PredictionResult> {
        let outcome = reading.and_then(|distance_cm| {
            logging::info(component, &format!("Distance received: {:.2} cm", distance_cm));
            let classifier = self
                .classifier
                .as_ref()
                .ok_or_else(|| RiskError::PredictionError("no model loaded".to_string()))?;
            inference::classify(classifier, distance_cm)
        });

        match outcome {
            Ok(result) => {
                self.stats.processed += 1;
                logging::debug(component, &format!("Classified: {}", result));
                Some(result)
            }
            Err(err) => {
                self.stats.dropped += 1;
                logging::log_stream_failure(component, &err);
                None
            }
        }
    }

    /// `Running -> Stopped`.
    pub fn finish(&mut self, component: Component) -> StreamStats {
        self.state = ConsumerState::Stopped;
        logging::log_run_summary(component, self.stats.processed, self.stats.dropped);
        self.stats
    }

    /// Pulls readings from `source` until it closes, handing every
    /// prediction to `on_result`. Predictions are only logged at debug, so
    /// `on_result` is where a caller reports them.
    pub fn run<S, F>(&mut self, source: &mut S, mut on_result: F) -> Result<StreamStats, RiskError>
    where
        S: ReadingSource + ?Sized,
        F: FnMut(&PredictionResult),
    {
        self.begin()?;
        let component = source.component();
        while let Some(reading) = source.next_reading() {
            if let Some(result) = self.process(component, reading) {
                on_result(&result);
            }
        }
        Ok(self.finish(component))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabeledSample, RiskLevel};
    use std::collections::VecDeque;

    /// Replays fixed payloads through `decode_payload`, then closes.
    struct ScriptedSource {
        payloads: VecDeque<Vec<u8>>,
    }

    impl ScriptedSource {
        fn new(payloads: &[&[u8]]) -> Self {
            Self { payloads: payloads.iter().map(|p| p.to_vec()).collect() }
        }
    }

    impl ReadingSource for ScriptedSource {
        fn component(&self) -> Component {
            Component::Monitor
        }

        fn next_reading(&mut self) -> Option<Result<f64, RiskError>> {
            self.payloads.pop_front().map(|p| decode_payload(&p))
        }
    }

    fn classifier() -> DecisionTree {
        let samples = vec![
            LabeledSample { distance_cm: 90.0, level: RiskLevel::Normal },
            LabeledSample { distance_cm: 55.0, level: RiskLevel::Normal },
            LabeledSample { distance_cm: 45.0, level: RiskLevel::Alert },
            LabeledSample { distance_cm: 25.0, level: RiskLevel::Alert },
            LabeledSample { distance_cm: 15.0, level: RiskLevel::Flood },
            LabeledSample { distance_cm: 7.0, level: RiskLevel::Flood },
        ];
        DecisionTree::fit(&samples, 3).unwrap()
    }

    #[test]
    fn test_decode_payload_accepts_decimal_strings() {
        assert_eq!(decode_payload(b"42.5").unwrap(), 42.5);
        assert_eq!(decode_payload(b" 17\n").unwrap(), 17.0);
        assert_eq!(decode_payload(b"-3e1").unwrap(), -30.0);
    }

    #[test]
    fn test_decode_payload_rejects_junk() {
        let payloads: [&[u8]; 6] = [b"notanumber", b"", b"12cm", b"\xff\xfe", b"NaN", b"inf"];
        for payload in payloads {
            assert!(
                matches!(decode_payload(payload), Err(RiskError::DecodeError(_))),
                "payload {:?} should not decode",
                payload
            );
        }
    }

    #[test]
    fn test_new_consumer_is_idle_and_refuses_to_run() {
        let mut consumer = StreamConsumer::new();
        assert_eq!(consumer.state(), ConsumerState::Idle);
        let mut source = ScriptedSource::new(&[b"80"]);
        let result = consumer.run(&mut source, |_| {});
        assert!(matches!(result, Err(RiskError::ConsumerNotReady(_))));
        assert_eq!(consumer.state(), ConsumerState::Idle);
        assert_eq!(source.payloads.len(), 1, "no reading should be consumed");
    }

    #[test]
    fn test_failed_load_keeps_consumer_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut consumer = StreamConsumer::new();
        let err = consumer.load_model(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, RiskError::ArtifactNotFound(_)));
        assert_eq!(consumer.state(), ConsumerState::Idle);
    }

    #[test]
    fn test_successful_load_moves_to_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        artifact::save(&classifier(), &path).unwrap();
        let mut consumer = StreamConsumer::new();
        consumer.load_model(&path).unwrap();
        assert_eq!(consumer.state(), ConsumerState::Ready);
    }

    #[test]
    fn test_bad_payload_is_dropped_and_loop_continues() {
        let mut consumer = StreamConsumer::with_classifier(classifier());
        consumer.begin().unwrap();

        let dropped = consumer.process(Component::Mqtt, decode_payload(b"notanumber"));
        assert!(dropped.is_none());
        assert_eq!(consumer.state(), ConsumerState::Running);

        let next = consumer.process(Component::Mqtt, decode_payload(b"10.0")).unwrap();
        assert_eq!(next.level, RiskLevel::Flood);
        assert_eq!(consumer.stats(), StreamStats { processed: 1, dropped: 1 });
    }

    #[test]
    fn test_run_classifies_until_source_closes() {
        let mut consumer = StreamConsumer::with_classifier(classifier());
        let mut source = ScriptedSource::new(&[b"80.0", b"garbage", b"35.0", b"10.0"]);
        let mut seen = Vec::new();
        let stats = consumer.run(&mut source, |r| seen.push(r.level)).unwrap();

        assert_eq!(seen, vec![RiskLevel::Normal, RiskLevel::Alert, RiskLevel::Flood]);
        assert_eq!(stats, StreamStats { processed: 3, dropped: 1 });
        assert_eq!(consumer.state(), ConsumerState::Stopped);
    }

    #[test]
    fn test_stopped_consumer_cannot_run_again() {
        let mut consumer = StreamConsumer::with_classifier(classifier());
        consumer.run(&mut ScriptedSource::new(&[]), |_| {}).unwrap();
        let again = consumer.run(&mut ScriptedSource::new(&[b"50"]), |_| {});
        assert!(matches!(again, Err(RiskError::ConsumerNotReady(_))));
    }
}
