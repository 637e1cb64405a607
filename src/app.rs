//! Core application runner (business logic) for `wave-listener`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit
//! codes so the poll loop can be tested deterministically with injected
//! connector, broker, pacer and output streams.

use crate::address::{DeviceAddress, ParseAddressError};
use crate::gatt::BleError;
use crate::output::OutputFormatter;
use crate::output::tsv::TsvFormatter;
use crate::publish::{MqttConfig, PublishError, TelemetryPayload};
use crate::reading::Reading;
use crate::sensor::{CharacteristicMap, FirmwareVariant, RawValue};
use clap::Parser;
use std::future::Future;
use std::io;
use std::io::Write;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Configuration for the poll loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Seconds to wait between poll cycles. 0 polls once and exits.
    #[arg(long, default_value_t = 1200, value_name = "N")]
    pub wait: u64,

    /// Hostname of an MQTT broker to publish readings to.
    #[arg(long, requires = "topic", value_name = "HOST")]
    pub mqtt: Option<String>,

    /// MQTT topic for published readings.
    #[arg(long, value_name = "T")]
    pub topic: Option<String>,

    /// MQTT username.
    #[arg(long, value_name = "U")]
    pub username: Option<String>,

    /// MQTT password.
    #[arg(long, value_name = "P")]
    pub password: Option<String>,

    /// MQTT broker port.
    #[arg(long, default_value_t = 1883, value_name = "N")]
    pub port: u16,

    /// Layout of the accel/light characteristic (firmware dependent)
    #[arg(long, default_value_t, value_enum)]
    pub accel_layout: FirmwareVariant,

    /// Bluetooth address of the sensor, e.g. AA:BB:CC:DD:EE:FF.
    #[arg(value_name = "DEVICE_ADDRESS")]
    pub address: Option<String>,
}

impl Options {
    /// Broker configuration, if publishing was requested.
    ///
    /// Returns `None` unless both `--mqtt` and `--topic` are present
    /// (argument parsing enforces the pairing for CLI users).
    pub fn mqtt_config(&self) -> Option<MqttConfig> {
        let host = self.mqtt.clone()?;
        let topic = self.topic.clone()?;
        Some(MqttConfig {
            host,
            port: self.port,
            topic,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

/// Errors returned by the run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("device address argument is required")]
    MissingAddress,
    #[error(transparent)]
    Address(#[from] ParseAddressError),
    #[error(transparent)]
    Ble(#[from] BleError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Connector abstraction to enable deterministic unit tests without
/// Bluetooth hardware.
///
/// One call performs one poll cycle's worth of raw reads: connect, read every
/// mapped characteristic the device exposes, disconnect.
pub trait Connector: Send + Sync {
    fn read_characteristics<'a>(
        &'a self,
        address: DeviceAddress,
        map: &'a CharacteristicMap,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawValue>, BleError>> + Send + 'a>>;
}

/// Publishes decoded readings to a broker topic.
pub trait Publisher: Send + Sync {
    fn publish<'a>(
        &'a self,
        payload: &'a TelemetryPayload,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;

    /// Release the broker connection at shutdown.
    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Broker abstraction: connects once at startup and hands back a publisher.
pub trait Broker: Send + Sync {
    fn connect<'a>(
        &'a self,
        config: &'a MqttConfig,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Publisher>, PublishError>> + Send + 'a>>;
}

/// Controls pacing between poll cycles.
pub trait Pacer: Send {
    /// Wait until the next cycle should run; `false` ends the loop.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Production pacer: sleeps `wait` seconds between cycles, or ends the loop
/// immediately (without sleeping) when the interval is zero.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPacer {
    interval: Duration,
}

impl IntervalPacer {
    pub fn new(wait_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(wait_secs),
        }
    }
}

impl Pacer for IntervalPacer {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let interval = self.interval;
        Box::pin(async move {
            if interval.is_zero() {
                false
            } else {
                tokio::time::sleep(interval).await;
                true
            }
        })
    }
}

async fn poll_cycle(
    connector: &dyn Connector,
    address: DeviceAddress,
    map: &CharacteristicMap,
) -> Result<Reading, BleError> {
    let raw = connector.read_characteristics(address, map).await?;
    Ok(map.decode(&raw))
}

/// Run the poll loop, writing reading lines to `out` and diagnostics to `err`.
///
/// - The broker connection is attempted once, up front; failure disables
///   publishing for the rest of the run but never stops polling.
/// - A failed cycle writes one diagnostic line and produces no output line
///   and no publish; the loop then proceeds to the wait step as usual.
/// - A failed publish is likewise reported and skipped; there is no delivery
///   guarantee.
pub async fn run_with_io(
    options: Options,
    connector: &dyn Connector,
    broker: Option<&dyn Broker>,
    pacer: &mut dyn Pacer,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let address: DeviceAddress = options
        .address
        .as_deref()
        .ok_or(RunError::MissingAddress)?
        .parse()?;
    let map = CharacteristicMap::for_variant(options.accel_layout);
    let formatter = TsvFormatter;

    let mut publisher: Option<Box<dyn Publisher>> = None;
    if let (Some(config), Some(broker)) = (options.mqtt_config(), broker) {
        match broker.connect(&config).await {
            Ok(connected) => publisher = Some(connected),
            Err(publish_err) => writeln!(err, "error: {publish_err}; publishing disabled")?,
        }
    }

    loop {
        match poll_cycle(connector, address, &map).await {
            Ok(reading) => {
                writeln!(out, "{}", formatter.format(&reading))?;
                out.flush()?;

                if let Some(publisher) = publisher.as_deref() {
                    let payload = TelemetryPayload::from(&reading);
                    if let Err(publish_err) = publisher.publish(&payload).await {
                        writeln!(err, "error: {publish_err}")?;
                    }
                }
            }
            Err(cycle_err) => writeln!(err, "error: {cycle_err}")?,
        }

        if !pacer.wait().await {
            break;
        }
    }

    if let Some(publisher) = publisher {
        publisher.close().await;
    }

    Ok(())
}
