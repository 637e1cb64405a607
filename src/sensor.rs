//! Characteristic map and value decoding for Wave-class radon monitors.
//!
//! The sensor exposes its registers as GATT characteristics under a single
//! primary service. Each known characteristic has a fixed little-endian
//! layout; the map from characteristic UUID to decode rule is plain data so
//! firmware variants (and future registers) are a table entry, not a code
//! change.

use crate::reading::Reading;
use chrono::Local;
use std::fmt;
use uuid::{Uuid, uuid};

/// Primary service holding the sensor registers.
pub const SENSOR_SERVICE: Uuid = uuid!("b42e1f6e-ade7-11e4-89d3-123b93f75cba");

/// Standard GATT Temperature characteristic.
pub const TEMPERATURE: Uuid = uuid!("00002a6e-0000-1000-8000-00805f9b34fb");
/// Standard GATT Humidity characteristic.
pub const HUMIDITY: Uuid = uuid!("00002a6f-0000-1000-8000-00805f9b34fb");
/// Long-term average radon concentration.
pub const RADON_AVERAGE: Uuid = uuid!("b42e0a4c-ade7-11e4-89d3-123b93f75cba");
/// Last-day radon concentration.
pub const RADON_ONE_DAY: Uuid = uuid!("b42e01aa-ade7-11e4-89d3-123b93f75cba");
/// Accelerometer state and ambient light, layout depends on firmware.
pub const ACCEL_LIGHT: Uuid = uuid!("b42e1096-ade7-11e4-89d3-123b93f75cba");
/// Status info; carries a second copy of the humidity value.
pub const STATUS_INFO: Uuid = uuid!("b42e1348-ade7-11e4-89d3-123b93f75cba");

/// Raw bytes read from one characteristic.
pub type RawValue = (Uuid, Vec<u8>);

/// Decode rule for one characteristic.
///
/// Short or malformed buffers leave the target field(s) absent; a reading
/// never fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    /// Signed 16-bit LE hundredths of a degree Celsius.
    Temperature,
    /// Signed 16-bit LE hundredths of a percent.
    Humidity,
    /// Signed 16-bit LE hundredths of a percent, from the status register.
    StatusHumidity,
    /// Signed 16-bit LE, used as-is.
    RadonAverage,
    /// Signed 16-bit LE, used as-is.
    RadonOneDay,
    /// Two unsigned bytes: accelerometer state, then brightness.
    AccelBrightness,
    /// Single unsigned 16-bit LE accelerometer word (older firmware).
    AccelWord,
}

impl Decode {
    fn apply(self, bytes: &[u8], reading: &mut Reading) {
        match self {
            Decode::Temperature => reading.temperature = scaled_i16(bytes),
            Decode::Humidity => reading.humidity = scaled_i16(bytes),
            Decode::StatusHumidity => reading.status_humidity = scaled_i16(bytes),
            Decode::RadonAverage => reading.radon_average = raw_i16(bytes),
            Decode::RadonOneDay => reading.radon_one_day = raw_i16(bytes),
            Decode::AccelBrightness => {
                if let [accel, brightness, ..] = bytes {
                    reading.accel = Some(u16::from(*accel));
                    reading.brightness = Some(*brightness);
                }
            }
            Decode::AccelWord => reading.accel = raw_u16(bytes),
        }
    }
}

fn raw_i16(bytes: &[u8]) -> Option<i16> {
    bytes.get(..2).map(|b| i16::from_le_bytes([b[0], b[1]]))
}

fn raw_u16(bytes: &[u8]) -> Option<u16> {
    bytes.get(..2).map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Integer hundredths divided by 100 exactly.
fn scaled_i16(bytes: &[u8]) -> Option<f64> {
    raw_i16(bytes).map(|v| f64::from(v) / 100.0)
}

/// Firmware layout of the accel/light characteristic.
///
/// Both layouts shipped in the field and neither supersedes the other; the
/// right one depends on the device's firmware revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FirmwareVariant {
    /// Accel byte followed by a brightness byte.
    #[default]
    Split,
    /// Single 16-bit accel word, no separate brightness.
    Word,
}

impl fmt::Display for FirmwareVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirmwareVariant::Split => write!(f, "split"),
            FirmwareVariant::Word => write!(f, "word"),
        }
    }
}

/// One entry of a characteristic map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicSpec {
    pub uuid: Uuid,
    pub decode: Decode,
}

/// Map from characteristic UUID to decode rule.
#[derive(Debug, Clone)]
pub struct CharacteristicMap {
    entries: Vec<CharacteristicSpec>,
}

impl CharacteristicMap {
    /// Build a map from arbitrary entries.
    pub fn new(entries: Vec<CharacteristicSpec>) -> Self {
        Self { entries }
    }

    /// The default register set for the given firmware variant.
    pub fn for_variant(variant: FirmwareVariant) -> Self {
        let accel_decode = match variant {
            FirmwareVariant::Split => Decode::AccelBrightness,
            FirmwareVariant::Word => Decode::AccelWord,
        };
        Self::new(vec![
            CharacteristicSpec {
                uuid: TEMPERATURE,
                decode: Decode::Temperature,
            },
            CharacteristicSpec {
                uuid: HUMIDITY,
                decode: Decode::Humidity,
            },
            CharacteristicSpec {
                uuid: RADON_AVERAGE,
                decode: Decode::RadonAverage,
            },
            CharacteristicSpec {
                uuid: RADON_ONE_DAY,
                decode: Decode::RadonOneDay,
            },
            CharacteristicSpec {
                uuid: ACCEL_LIGHT,
                decode: accel_decode,
            },
            CharacteristicSpec {
                uuid: STATUS_INFO,
                decode: Decode::StatusHumidity,
            },
        ])
    }

    /// Whether `uuid` is a known characteristic in this map.
    pub fn contains(&self, uuid: Uuid) -> bool {
        self.entries.iter().any(|spec| spec.uuid == uuid)
    }

    /// Decode a batch of raw characteristic values into a [`Reading`].
    ///
    /// Unknown UUIDs are ignored; characteristics missing from `raw` leave
    /// their fields absent. The reading is stamped with the current local
    /// time.
    pub fn decode(&self, raw: &[RawValue]) -> Reading {
        let mut reading = Reading::empty(Local::now());
        for (uuid, bytes) in raw {
            if let Some(spec) = self.entries.iter().find(|spec| spec.uuid == *uuid) {
                spec.decode.apply(bytes, &mut reading);
            }
        }
        reading
    }
}
