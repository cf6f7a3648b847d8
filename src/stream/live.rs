/// MQTT reading source.
///
/// Subscribes to one topic and turns every published payload into a
/// reading. The sensor publishes the distance as a plain decimal string
/// (e.g. `"37.42"`); nothing is published back.
///
/// `connect` blocks until the broker has acknowledged the subscription, so
/// an unreachable broker or a refused topic is a startup failure. After
/// that, reconnection is left to the transport: when the event loop reports
/// a connection error or the broker disconnects us, the source closes and
/// the monitor stops.

use std::time::Duration;

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS, SubAck, SubscribeReasonCode};

use crate::config::MqttConfig;
use crate::logging::{self, Component};
use crate::model::RiskError;
use crate::stream::{decode_payload, ReadingSource};

/// Requests buffered between the client handle and the event loop.
const REQUEST_CAPACITY: usize = 10;

pub struct MqttSource {
    client: Client,
    connection: Connection,
    topic: String,
    broker: String,
}

/// Fails unless the broker granted every requested subscription.
pub fn check_suback(suback: &SubAck, topic: &str) -> Result<(), RiskError> {
    if suback.return_codes.is_empty() {
        return Err(RiskError::TransportError(format!(
            "broker acknowledged no subscription for '{}'",
            topic
        )));
    }
    if suback
        .return_codes
        .iter()
        .any(|code| matches!(code, SubscribeReasonCode::Failure))
    {
        return Err(RiskError::TransportError(format!(
            "broker refused subscription to '{}'",
            topic
        )));
    }
    Ok(())
}

impl MqttSource {
    /// Connects to the broker and waits for the subscription to be granted.
    pub fn connect(config: &MqttConfig) -> Result<Self, RiskError> {
        let mut source = Self::new(config)?;
        source.await_subscription()?;
        Ok(source)
    }

    /// Creates the client and queues the subscription without touching
    /// the network.
    pub fn new(config: &MqttConfig) -> Result<Self, RiskError> {
        let mut options = MqttOptions::new(config.client_id.as_str(), config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        client
            .subscribe(config.topic.as_str(), QoS::AtMostOnce)
            .map_err(|e| RiskError::TransportError(format!("subscribe to '{}' failed: {}", config.topic, e)))?;

        Ok(Self {
            client,
            connection,
            topic: config.topic.clone(),
            broker: format!("{}:{}", config.host, config.port),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Drives the event loop until the subscription is acknowledged.
    /// A connection error or a refused topic is a `TransportError`.
    pub fn await_subscription(&mut self) -> Result<(), RiskError> {
        loop {
            let event = self.connection.iter().next().ok_or_else(|| {
                RiskError::TransportError(format!("event loop for {} closed before subscribing", self.broker))
            })?;
            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    logging::debug(Component::Mqtt, &format!("Connected to {}", self.broker));
                }
                Ok(Event::Incoming(Packet::SubAck(suback))) => {
                    check_suback(&suback, &self.topic)?;
                    logging::info(
                        Component::Mqtt,
                        &format!(
                            "Connected to MQTT broker {}. Waiting for sensor data on '{}'...",
                            self.broker, self.topic
                        ),
                    );
                    return Ok(());
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    return Err(RiskError::TransportError(format!(
                        "broker {} closed the session before subscribing",
                        self.broker
                    )));
                }
                Ok(_) => {}
                Err(e) => {
                    return Err(RiskError::TransportError(format!(
                        "cannot reach broker {}: {}",
                        self.broker, e
                    )));
                }
            }
        }
    }
}

impl ReadingSource for MqttSource {
    fn component(&self) -> Component {
        Component::Mqtt
    }

    fn next_reading(&mut self) -> Option<Result<f64, RiskError>> {
        loop {
            match self.connection.iter().next()? {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    logging::debug(Component::Mqtt, &format!("Connected to {}", self.broker));
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    logging::debug(
                        Component::Mqtt,
                        &format!("{} bytes on '{}'", publish.payload.len(), publish.topic),
                    );
                    return Some(decode_payload(&publish.payload));
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    logging::warn(Component::Mqtt, &format!("Broker {} closed the session", self.broker));
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    logging::error(Component::Mqtt, &format!("Connection to {} lost: {}", self.broker, e));
                    return None;
                }
            }
        }
    }
}

impl Drop for MqttSource {
    fn drop(&mut self) {
        if let Err(e) = self.client.disconnect() {
            logging::debug(Component::Mqtt, &format!("Disconnect from {} failed: {}", self.broker, e));
        }
    }
}
