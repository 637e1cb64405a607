//! MQTT publishing for decoded readings.
//!
//! The broker connection is established once at startup and held for the
//! process lifetime. Publishes are QoS 0: a reading that does not reach the
//! broker is dropped and reported, never retried.

use crate::app::{Broker, Publisher};
use crate::reading::Reading;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Client identifier presented to the broker.
const CLIENT_ID: &str = "wave-listener";
/// How long to wait for the broker handshake at startup.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// Request queue capacity of the async client.
const REQUEST_CAPACITY: usize = 10;

/// Broker endpoint and topic configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Errors raised by the publishing side.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("could not connect to broker: {0}")]
    Connect(String),
    #[error("publish failed: {0}")]
    Publish(String),
}

/// Subset of a reading forwarded to the broker.
///
/// `radon` carries the 1-day concentration. Absent measurements serialize
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryPayload {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub radon: Option<i16>,
    pub brightness: Option<u8>,
}

impl From<&Reading> for TelemetryPayload {
    fn from(reading: &Reading) -> Self {
        Self {
            temperature: reading.temperature,
            humidity: reading.humidity,
            radon: reading.radon_one_day,
            brightness: reading.brightness,
        }
    }
}

/// Publisher over a rumqttc async client.
pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
}

impl MqttPublisher {
    /// Connect and wait for the broker handshake, so an unreachable broker
    /// is reported once at startup instead of on the first publish.
    pub async fn connect(config: &MqttConfig) -> Result<Self, PublishError> {
        let mut options = MqttOptions::new(CLIENT_ID, &config.host, config.port);
        options.set_keep_alive(KEEP_ALIVE);
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.as_deref().unwrap_or_default());
        }

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        let handshake = timeout(CONNECT_TIMEOUT, async {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
                    Ok(_) => continue,
                    Err(err) => return Err(PublishError::Connect(err.to_string())),
                }
            }
        })
        .await;

        match handshake {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(PublishError::Connect(format!(
                    "no response from {}:{} within {}s",
                    config.host,
                    config.port,
                    CONNECT_TIMEOUT.as_secs()
                )));
            }
        }

        // The event loop must keep turning for keep-alives and acks. If it
        // fails mid-run the pump stops and later publishes surface the error
        // cycle by cycle; the connection is not re-established.
        tokio::spawn(async move { while event_loop.poll().await.is_ok() {} });

        Ok(Self {
            client,
            topic: config.topic.clone(),
        })
    }

    async fn publish_payload(&self, payload: &TelemetryPayload) -> Result<(), PublishError> {
        let body =
            serde_json::to_vec(payload).map_err(|err| PublishError::Publish(err.to_string()))?;
        self.client
            .publish(&self.topic, QoS::AtMostOnce, false, body)
            .await
            .map_err(|err| PublishError::Publish(err.to_string()))
    }
}

impl Publisher for MqttPublisher {
    fn publish<'a>(
        &'a self,
        payload: &'a TelemetryPayload,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(self.publish_payload(payload))
    }

    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let _ = self.client.disconnect().await;
        })
    }
}

/// Factory used by the run loop to open the startup broker connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct RumqttcBroker;

impl Broker for RumqttcBroker {
    fn connect<'a>(
        &'a self,
        config: &'a MqttConfig,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Publisher>, PublishError>> + Send + 'a>> {
        Box::pin(async move {
            let publisher = MqttPublisher::connect(config).await?;
            Ok(Box::new(publisher) as Box<dyn Publisher>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{full_reading, test_timestamp};

    #[test]
    fn test_payload_from_reading_uses_one_day_radon() {
        let payload = TelemetryPayload::from(&full_reading(test_timestamp()));
        assert_eq!(payload.temperature, Some(21.50));
        assert_eq!(payload.humidity, Some(45.67));
        assert_eq!(payload.radon, Some(9));
        assert_eq!(payload.brightness, Some(200));
    }

    #[test]
    fn test_payload_serializes_to_flat_json() {
        let payload = TelemetryPayload::from(&full_reading(test_timestamp()));
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"temperature":21.5,"humidity":45.67,"radon":9,"brightness":200}"#
        );
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let payload = TelemetryPayload {
            temperature: None,
            humidity: Some(45.67),
            radon: None,
            brightness: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"temperature":null,"humidity":45.67,"radon":null,"brightness":null}"#
        );
    }

    #[test]
    fn test_connect_error_display() {
        let err = PublishError::Connect("connection refused".to_string());
        assert_eq!(
            format!("{}", err),
            "could not connect to broker: connection refused"
        );
    }
}
