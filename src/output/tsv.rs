//! Tab-separated output line, one per successful poll cycle.

use crate::output::OutputFormatter;
use crate::reading::Reading;
use std::fmt;

/// Placeholder for measurements the device did not provide. Keeps the line
/// at a fixed seven columns so downstream `cut`/`awk` pipelines stay stable.
const MISSING: &str = "-";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats readings as
/// `timestamp<TAB>temperature<TAB>humidity<TAB>radon_avg<TAB>radon_1day<TAB>brightness<TAB>accel`.
///
/// Temperature and humidity are printed with two decimals, radon values and
/// brightness as plain integers, and the accel state as two-digit uppercase
/// hex (wider on firmware that reports a 16-bit word).
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvFormatter;

fn two_decimals(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"))
}

fn integer<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn hex_byte(value: Option<u16>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:02X}"))
}

impl OutputFormatter for TsvFormatter {
    fn format(&self, reading: &Reading) -> String {
        let timestamp = reading.timestamp.format(TIMESTAMP_FORMAT);
        let temperature = two_decimals(reading.temperature);
        let humidity = two_decimals(reading.humidity);
        let radon_average = integer(reading.radon_average);
        let radon_one_day = integer(reading.radon_one_day);
        let brightness = integer(reading.brightness);
        let accel = hex_byte(reading.accel);
        format!(
            "{timestamp}\t{temperature}\t{humidity}\t{radon_average}\t{radon_one_day}\t{brightness}\t{accel}"
        )
    }
}
