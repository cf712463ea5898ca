//! WinRT BLE Transport
//!
//! Opens the robot through the Windows Bluetooth LE APIs and writes commands
//! to the characteristic matching the requested attribute handle.

use crate::error::TransportError;
use crate::infrastructure::bluetooth::handle_cache::{HandleCache, Lookup};
use crate::infrastructure::bluetooth::{protocol, BleLink, BleTransport};
use tracing::{debug, info, warn};
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattCommunicationStatus, GattDeviceService,
};
use windows::Devices::Bluetooth::{
    BluetoothCacheMode, BluetoothConnectionStatus, BluetoothLEDevice,
};
use windows::Storage::Streams::DataWriter;

fn gatt_error(e: windows::core::Error) -> TransportError {
    TransportError::Gatt(e.message().to_string())
}

#[derive(Debug, Default)]
pub struct WinRtTransport;

impl WinRtTransport {
    pub fn new() -> Self {
        Self
    }
}

impl BleTransport for WinRtTransport {
    type Link = WinRtLink;

    async fn connect(&mut self, address: &str) -> Result<Self::Link, TransportError> {
        let raw_address = protocol::parse_address(address)?;
        info!("Connecting to Bluetooth device: {:#X}", raw_address);

        let device = BluetoothLEDevice::FromBluetoothAddressAsync(raw_address)
            .map_err(gatt_error)?
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.message().to_string()))?;
        info!("Device opened: {:?}", device.Name().unwrap_or_default());

        Ok(WinRtLink {
            device: Some(device),
            services: Vec::new(),
            characteristics: HandleCache::new(),
        })
    }
}

pub struct WinRtLink {
    device: Option<BluetoothLEDevice>,
    services: Vec<GattDeviceService>,
    /// Every characteristic on the device, keyed by attribute handle
    characteristics: HandleCache<GattCharacteristic>,
}

impl WinRtLink {
    fn device(&self) -> Result<&BluetoothLEDevice, TransportError> {
        let device = self.device.as_ref().ok_or(TransportError::NotConnected)?;
        let connected = device
            .ConnectionStatus()
            .map(|s| s == BluetoothConnectionStatus::Connected)
            .unwrap_or(false);

        // A freshly opened device reports Disconnected until the first GATT
        // access, so only refuse once characteristics have been resolved.
        if !connected && self.characteristics.is_resolved() {
            return Err(TransportError::NotConnected);
        }
        Ok(device)
    }

    async fn characteristic(&mut self, handle: u16) -> Result<GattCharacteristic, TransportError> {
        if !self.characteristics.is_resolved() {
            self.resolve_characteristics().await?;
        }

        match self.characteristics.lookup(handle) {
            Lookup::Found(c) => Ok(c),
            Lookup::Missing | Lookup::Unresolved => Err(TransportError::Gatt(format!(
                "No characteristic at handle {:#06x}",
                handle
            ))),
        }
    }

    fn close_services(&mut self) {
        self.characteristics.clear();
        for service in self.services.drain(..) {
            let _ = service.Close();
        }
    }

    /// Walk the GATT table once and cache every characteristic by handle
    async fn resolve_characteristics(&mut self) -> Result<(), TransportError> {
        self.close_services();

        let services_result = self
            .device()?
            .GetGattServicesWithCacheModeAsync(BluetoothCacheMode::Uncached)
            .map_err(gatt_error)?
            .await
            .map_err(gatt_error)?;
        match services_result.Status().map_err(gatt_error)? {
            GattCommunicationStatus::Success => {}
            GattCommunicationStatus::Unreachable => return Err(TransportError::NotConnected),
            status => {
                return Err(TransportError::Gatt(format!(
                    "Failed to get GATT services: {:?}",
                    status
                )))
            }
        }

        let mut services = Vec::new();
        let mut found = Vec::new();
        let list = services_result.Services().map_err(gatt_error)?;
        for i in 0..list.Size().map_err(gatt_error)? {
            let service = list.GetAt(i).map_err(gatt_error)?;
            let chars_result = service
                .GetCharacteristicsWithCacheModeAsync(BluetoothCacheMode::Uncached)
                .map_err(gatt_error)?
                .await
                .map_err(gatt_error)?;

            if chars_result.Status().map_err(gatt_error)? != GattCommunicationStatus::Success {
                warn!("Skipping service {} with unreadable characteristics", i);
                let _ = service.Close();
                continue;
            }

            let characteristics = chars_result.Characteristics().map_err(gatt_error)?;
            for j in 0..characteristics.Size().map_err(gatt_error)? {
                let c = characteristics.GetAt(j).map_err(gatt_error)?;
                found.push((c.AttributeHandle().map_err(gatt_error)?, c));
            }
            services.push(service);
        }

        debug!("Resolved {} characteristics", found.len());
        self.services = services;
        self.characteristics.fill(found);
        Ok(())
    }
}

impl BleLink for WinRtLink {
    async fn write_characteristic(
        &mut self,
        handle: u16,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let characteristic = self.characteristic(handle).await?;
        self.device()?;

        let writer = DataWriter::new().map_err(gatt_error)?;
        writer.WriteBytes(payload).map_err(gatt_error)?;
        let buffer = writer.DetachBuffer().map_err(gatt_error)?;

        let status = characteristic
            .WriteValueAsync(&buffer)
            .map_err(gatt_error)?
            .await
            .map_err(gatt_error)?;

        match status {
            GattCommunicationStatus::Success => Ok(()),
            GattCommunicationStatus::Unreachable => Err(TransportError::NotConnected),
            status => Err(TransportError::Gatt(format!("Write returned {:?}", status))),
        }
    }

    async fn disconnect(&mut self) {
        self.close_services();
        if let Some(device) = self.device.take() {
            let _ = device.Close();
        }
        info!("Disconnected from device");
    }
}
