//! `wave-listener` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit
//! codes. The core "business logic" lives in [`crate::app`] where it can be
//! tested deterministically with injected connector, broker, pacer and output
//! streams.

pub mod address;
pub mod app;
pub mod gatt;
pub mod output;
pub mod publish;
pub mod reading;
pub mod sensor;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use address::{DeviceAddress, ParseAddressError};
pub use app::{Broker, Connector, IntervalPacer, Options, Pacer, Publisher, RunError, run_with_io};
pub use gatt::{BleError, BluerConnector};
pub use output::OutputFormatter;
pub use output::tsv::TsvFormatter;
pub use publish::{MqttConfig, MqttPublisher, PublishError, RumqttcBroker, TelemetryPayload};
pub use reading::Reading;
pub use sensor::{CharacteristicMap, CharacteristicSpec, Decode, FirmwareVariant};
