//! Bluetooth Module
//!
//! Provides BLE communication with the Meccanoid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RobotService                        │
//! │  (Commanded state + transmit - public API)               │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┴─────────────┐
//!         │                           │
//!         ▼                           ▼
//! ┌────────────────┐          ┌──────────────┐
//! │  BleTransport  │          │   Protocol   │
//! │                │          │              │
//! │ - WinRT        │          │ - Tags       │
//! │ - Simulated    │          │ - Encoding   │
//! │                │          │ - Checksum   │
//! └────────────────┘          └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`handle_cache`] - Per-link attribute handle table
//! - [`protocol`] - Wire format, command encoding and checksum
//! - [`service`] - Main service owning the link and the robot state
//! - [`simulated`] - In-memory transport
//! - `winrt` - Windows BLE transport (Windows only)

pub mod handle_cache;
pub mod protocol;
pub mod service;
pub mod simulated;
#[cfg(windows)]
pub mod winrt;

use crate::error::TransportError;

pub use service::{ConnectionConfig, RobotService};

/// Opens links to a peripheral
#[allow(async_fn_in_trait)]
pub trait BleTransport {
    type Link: BleLink;

    /// Establish a link to the device at `address`
    async fn connect(&mut self, address: &str) -> Result<Self::Link, TransportError>;
}

/// An established link to a peripheral
#[allow(async_fn_in_trait)]
pub trait BleLink {
    /// Write `payload` to the characteristic at `handle`
    ///
    /// Returns [`TransportError::NotConnected`] once the peripheral has gone.
    async fn write_characteristic(
        &mut self,
        handle: u16,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    async fn disconnect(&mut self);
}
