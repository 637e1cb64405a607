//! Bluetooth device address handling.
//!
//! The CLI takes the sensor's address as its positional argument. This type
//! keeps the rest of the crate independent of the Bluetooth library while
//! converting losslessly at the radio boundary.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Bluetooth device address stored as a compact 6-byte array.
///
/// Accepts `:` or `-` separated hex octets in either case when parsed, and
/// always displays in the canonical uppercase colon form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    /// Build an address from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets, most significant first.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// Errors returned when parsing a device address string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("invalid device address: expected 6 octets separated by ':' or '-', got {0}")]
    OctetCount(usize),
    #[error("invalid device address: '{0}' is not a two-digit hex octet")]
    BadOctet(String),
}

impl FromStr for DeviceAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(ParseAddressError::OctetCount(parts.len()));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(ParseAddressError::BadOctet((*part).to_string()));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| ParseAddressError::BadOctet((*part).to_string()))?;
        }

        Ok(Self(octets))
    }
}

impl From<[u8; 6]> for DeviceAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl From<bluer::Address> for DeviceAddress {
    fn from(addr: bluer::Address) -> Self {
        Self(addr.0)
    }
}

impl From<DeviceAddress> for bluer::Address {
    fn from(addr: DeviceAddress) -> Self {
        bluer::Address(addr.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let addr = DeviceAddress::new([0x98, 0x07, 0x2D, 0x3A, 0x44, 0x01]);
        assert_eq!(format!("{}", addr), "98:07:2D:3A:44:01");
    }

    #[test]
    fn test_parse_colon_separated() {
        let addr: DeviceAddress = "98:07:2D:3A:44:01".parse().unwrap();
        assert_eq!(addr.octets(), [0x98, 0x07, 0x2D, 0x3A, 0x44, 0x01]);
    }

    #[test]
    fn test_parse_dash_separated_lowercase() {
        let addr: DeviceAddress = "98-07-2d-3a-44-01".parse().unwrap();
        assert_eq!(addr.octets(), [0x98, 0x07, 0x2D, 0x3A, 0x44, 0x01]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "nonsense".parse::<DeviceAddress>(),
            Err(ParseAddressError::OctetCount(1))
        ));
        assert!(matches!(
            "98:07:2D".parse::<DeviceAddress>(),
            Err(ParseAddressError::OctetCount(3))
        ));
        assert!(matches!(
            "98:07:2D:3A:44:ZZ".parse::<DeviceAddress>(),
            Err(ParseAddressError::BadOctet(_))
        ));
        assert!(matches!(
            "98:07:2D:3A:44:001".parse::<DeviceAddress>(),
            Err(ParseAddressError::BadOctet(_))
        ));
    }

    #[test]
    fn test_bluer_round_trip() {
        let addr = DeviceAddress::new([0x98, 0x07, 0x2D, 0x3A, 0x44, 0x01]);
        let bluer_addr: bluer::Address = addr.into();
        assert_eq!(DeviceAddress::from(bluer_addr), addr);
    }
}
