//! Decoded sensor snapshot for a single poll cycle.

use chrono::{DateTime, Local};

/// One decoded snapshot of the sensor's registers.
///
/// Every measurement is optional: a characteristic the device does not expose
/// (or exposes with an unexpected width) simply leaves its field absent.
/// Units:
/// - Temperature in Celsius
/// - Humidity in percent (0-100)
/// - Radon concentrations as raw device integers (Bq/m3)
/// - Accel state and brightness as raw register values
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Local wall-clock time the snapshot was decoded
    pub timestamp: DateTime<Local>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100)
    pub humidity: Option<f64>,
    /// Long-term average radon concentration
    pub radon_average: Option<i16>,
    /// Last-day radon concentration
    pub radon_one_day: Option<i16>,
    /// Accelerometer state byte, or the full 16-bit word on older firmware
    pub accel: Option<u16>,
    /// Ambient brightness byte (absent on firmware with the 16-bit accel word)
    pub brightness: Option<u8>,
    /// Secondary humidity value from the status characteristic
    pub status_humidity: Option<f64>,
}

impl Reading {
    /// A reading with every measurement absent, stamped with `timestamp`.
    pub fn empty(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            temperature: None,
            humidity: None,
            radon_average: None,
            radon_one_day: None,
            accel: None,
            brightness: None,
            status_humidity: None,
        }
    }
}
