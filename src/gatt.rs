//! BlueZ D-Bus connector for per-cycle GATT readout.
//!
//! Uses the `bluer` crate to talk to the BlueZ daemon. The adapter session is
//! held for the process lifetime; the link to the sensor is opened and closed
//! once per poll cycle, on every exit path.

use crate::address::DeviceAddress;
use crate::app::Connector;
use crate::sensor::{CharacteristicMap, RawValue, SENSOR_SERVICE};
use bluer::gatt::remote::Service;
use bluer::{Adapter, AdapterEvent, Address, Device, Session};
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};

/// How long to scan for a device the adapter does not already know.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);
/// How long to wait for BlueZ to finish GATT service resolution after connect.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);
const RESOLVE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Error type for connector operations.
#[derive(Error, Debug)]
pub enum BleError {
    /// Peripheral unreachable or not found
    #[error("could not connect to {address}: {reason}")]
    Connect { address: DeviceAddress, reason: String },
    /// Link drop or read fault mid-cycle
    #[error("read failed: {0}")]
    Read(String),
    /// Adapter or D-Bus fault
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

impl From<bluer::Error> for BleError {
    fn from(err: bluer::Error) -> Self {
        BleError::Bluetooth(err.to_string())
    }
}

/// Connector backed by the BlueZ daemon.
pub struct BluerConnector {
    // Dropping the session would tear down the D-Bus connection under the
    // adapter, so it is kept alongside it.
    _session: Session,
    adapter: Adapter,
}

impl BluerConnector {
    /// Open the default Bluetooth adapter and power it on.
    pub async fn new() -> Result<Self, BleError> {
        let session = Session::new().await?;
        let adapter = session.default_adapter().await?;
        adapter.set_powered(true).await?;
        Ok(Self {
            _session: session,
            adapter,
        })
    }

    /// One poll cycle: resolve, connect, read all mapped characteristics,
    /// disconnect. No connect retries; the caller retries on the next cycle.
    async fn read_cycle(
        &self,
        address: DeviceAddress,
        map: &CharacteristicMap,
    ) -> Result<Vec<RawValue>, BleError> {
        let device = self.resolve_device(address).await?;
        device
            .connect()
            .await
            .map_err(|err| BleError::Connect {
                address,
                reason: err.to_string(),
            })?;

        let result = read_mapped(&device, map).await;

        // Disconnect on every exit path; a failed teardown must not mask
        // the read result.
        let _ = device.disconnect().await;

        result
    }

    /// Get a handle for `address`, scanning for it first if the adapter has
    /// not seen it yet.
    async fn resolve_device(&self, address: DeviceAddress) -> Result<Device, BleError> {
        let target: Address = address.into();
        if !self.adapter.device_addresses().await?.contains(&target) {
            self.discover(address).await?;
        }
        Ok(self.adapter.device(target)?)
    }

    async fn discover(&self, address: DeviceAddress) -> Result<(), BleError> {
        let target: Address = address.into();
        let mut events = self.adapter.discover_devices().await?;

        let found = timeout(DISCOVERY_TIMEOUT, async {
            while let Some(event) = events.next().await {
                if let AdapterEvent::DeviceAdded(added) = event
                    && added == target
                {
                    return true;
                }
            }
            false
        })
        .await;

        match found {
            Ok(true) => Ok(()),
            _ => Err(BleError::Connect {
                address,
                reason: "device not found during discovery".into(),
            }),
        }
    }
}

async fn read_mapped(device: &Device, map: &CharacteristicMap) -> Result<Vec<RawValue>, BleError> {
    wait_services_resolved(device).await?;
    let service = find_sensor_service(device).await?;

    let mut values = Vec::new();
    for characteristic in service.characteristics().await? {
        let uuid = characteristic.uuid().await?;
        if !map.contains(uuid) {
            continue;
        }
        let bytes = characteristic
            .read()
            .await
            .map_err(|err| BleError::Read(format!("characteristic {uuid}: {err}")))?;
        values.push((uuid, bytes));
    }

    Ok(values)
}

/// BlueZ resolves GATT services asynchronously after connect; poll until it
/// is done or the deadline passes.
async fn wait_services_resolved(device: &Device) -> Result<(), BleError> {
    let resolved = timeout(RESOLVE_TIMEOUT, async {
        loop {
            if device.is_services_resolved().await? {
                return Ok::<_, bluer::Error>(());
            }
            sleep(RESOLVE_POLL_INTERVAL).await;
        }
    })
    .await;

    match resolved {
        Ok(inner) => inner.map_err(BleError::from),
        Err(_) => Err(BleError::Read(
            "GATT services were not resolved in time".into(),
        )),
    }
}

async fn find_sensor_service(device: &Device) -> Result<Service, BleError> {
    for service in device.services().await? {
        if service.uuid().await? == SENSOR_SERVICE {
            return Ok(service);
        }
    }
    Err(BleError::Read(format!(
        "sensor service {SENSOR_SERVICE} not present on device"
    )))
}

impl Connector for BluerConnector {
    fn read_characteristics<'a>(
        &'a self,
        address: DeviceAddress,
        map: &'a CharacteristicMap,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawValue>, BleError>> + Send + 'a>> {
        Box::pin(self.read_cycle(address, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display() {
        let err = BleError::Connect {
            address: DeviceAddress::new([0x98, 0x07, 0x2D, 0x3A, 0x44, 0x01]),
            reason: "le-connection-abort-by-local".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "could not connect to 98:07:2D:3A:44:01: le-connection-abort-by-local"
        );
    }

    #[test]
    fn test_read_error_display() {
        let err = BleError::Read("characteristic read timed out".to_string());
        assert_eq!(format!("{}", err), "read failed: characteristic read timed out");
    }
}
