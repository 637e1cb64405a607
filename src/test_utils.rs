use crate::reading::Reading;
use crate::sensor::{self, RawValue};
use chrono::{DateTime, Local, TimeZone};

/// Fixed local timestamp for deterministic formatting tests.
pub fn test_timestamp() -> DateTime<Local> {
    Local.with_ymd_and_hms(2023, 4, 1, 12, 30, 0).unwrap()
}

/// Raw characteristic values for the canonical test cycle: temperature
/// 21.50 °C, humidity 45.67 %, radon 12/9, accel 3, brightness 200.
pub fn full_raw_values() -> Vec<RawValue> {
    vec![
        (sensor::TEMPERATURE, 2150i16.to_le_bytes().to_vec()),
        (sensor::HUMIDITY, 4567i16.to_le_bytes().to_vec()),
        (sensor::RADON_AVERAGE, 12i16.to_le_bytes().to_vec()),
        (sensor::RADON_ONE_DAY, 9i16.to_le_bytes().to_vec()),
        (sensor::ACCEL_LIGHT, vec![0x03, 0xC8]),
        (sensor::STATUS_INFO, 4567i16.to_le_bytes().to_vec()),
    ]
}

/// The decoded form of [`full_raw_values`], stamped with `timestamp`.
pub fn full_reading(timestamp: DateTime<Local>) -> Reading {
    Reading {
        timestamp,
        temperature: Some(21.50),
        humidity: Some(45.67),
        radon_average: Some(12),
        radon_one_day: Some(9),
        accel: Some(3),
        brightness: Some(200),
        status_humidity: Some(45.67),
    }
}
