//! Simulated Transport
//!
//! In-memory stand-in for a robot. Records every characteristic write and
//! lets callers refuse connections or pull the link out from under the
//! client. Clones share the same simulated device.

use crate::error::TransportError;
use crate::infrastructure::bluetooth::{BleLink, BleTransport};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct SimulatedDevice {
    connected_addresses: Vec<String>,
    writes: Vec<(u16, Vec<u8>)>,
    session: u64,
    link_up: bool,
    refuse_connections: bool,
    drop_after: Option<usize>,
    next_write_error: Option<TransportError>,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedTransport {
    device: Arc<Mutex<SimulatedDevice>>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn device(&self) -> MutexGuard<'_, SimulatedDevice> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every write so far as `(handle, frame)`
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.device().writes.clone()
    }

    /// Frames written so far, in order
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.device()
            .writes
            .iter()
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn clear_writes(&self) {
        self.device().writes.clear();
    }

    /// Addresses passed to every successful connect
    pub fn connected_addresses(&self) -> Vec<String> {
        self.device().connected_addresses.clone()
    }

    pub fn is_link_up(&self) -> bool {
        self.device().link_up
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.device().refuse_connections = refuse;
    }

    /// Simulate the robot going out of range
    pub fn drop_link(&self) {
        self.device().link_up = false;
    }

    /// Let `writes` more writes through, then drop the link
    pub fn drop_link_after(&self, writes: usize) {
        self.device().drop_after = Some(writes);
    }

    /// Fail the next write with `error` without touching the link
    pub fn fail_next_write(&self, error: TransportError) {
        self.device().next_write_error = Some(error);
    }
}

impl BleTransport for SimulatedTransport {
    type Link = SimulatedLink;

    async fn connect(&mut self, address: &str) -> Result<Self::Link, TransportError> {
        let mut device = self.device();
        if device.refuse_connections {
            return Err(TransportError::ConnectionFailed(format!(
                "{} did not answer",
                address
            )));
        }

        device.session += 1;
        device.link_up = true;
        device.connected_addresses.push(address.to_string());
        debug!(address, session = device.session, "Simulated link up");

        Ok(SimulatedLink {
            device: Arc::clone(&self.device),
            session: device.session,
        })
    }
}

#[derive(Debug)]
pub struct SimulatedLink {
    device: Arc<Mutex<SimulatedDevice>>,
    session: u64,
}

impl BleLink for SimulatedLink {
    async fn write_characteristic(
        &mut self,
        handle: u16,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);

        if device.drop_after == Some(0) {
            device.drop_after = None;
            device.link_up = false;
        }
        if !device.link_up || device.session != self.session {
            return Err(TransportError::NotConnected);
        }
        if let Some(error) = device.next_write_error.take() {
            return Err(error);
        }
        if let Some(remaining) = device.drop_after.as_mut() {
            *remaining -= 1;
        }

        device.writes.push((handle, payload.to_vec()));
        Ok(())
    }

    async fn disconnect(&mut self) {
        let mut device = self.device.lock().unwrap_or_else(PoisonError::into_inner);
        if device.session == self.session {
            device.link_up = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes() {
        let mut transport = SimulatedTransport::new();
        let mut link = transport.connect("aa:bb:cc:dd:ee:ff").await.unwrap();
        link.write_characteristic(0x1f, &[1, 2, 3]).await.unwrap();

        assert_eq!(transport.writes(), vec![(0x1f, vec![1, 2, 3])]);
        assert_eq!(transport.connected_addresses(), vec!["aa:bb:cc:dd:ee:ff"]);
    }

    #[tokio::test]
    async fn test_dropped_link_rejects_writes() {
        let mut transport = SimulatedTransport::new();
        let mut link = transport.connect("x").await.unwrap();
        transport.drop_link();

        assert_eq!(
            link.write_characteristic(0x1f, &[1]).await,
            Err(TransportError::NotConnected)
        );
        assert!(transport.writes().is_empty());
    }

    #[tokio::test]
    async fn test_stale_link_after_reconnect() {
        let mut transport = SimulatedTransport::new();
        let mut old = transport.connect("x").await.unwrap();
        let mut new = transport.connect("x").await.unwrap();

        assert_eq!(
            old.write_characteristic(0x1f, &[1]).await,
            Err(TransportError::NotConnected)
        );
        assert!(new.write_characteristic(0x1f, &[2]).await.is_ok());
    }

    #[tokio::test]
    async fn test_drop_link_after() {
        let mut transport = SimulatedTransport::new();
        let mut link = transport.connect("x").await.unwrap();
        transport.drop_link_after(1);

        assert!(link.write_characteristic(0x1f, &[1]).await.is_ok());
        assert_eq!(
            link.write_characteristic(0x1f, &[2]).await,
            Err(TransportError::NotConnected)
        );
        assert!(!transport.is_link_up());
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let mut transport = SimulatedTransport::new();
        transport.refuse_connections(true);
        assert!(matches!(
            transport.connect("x").await,
            Err(TransportError::ConnectionFailed(_))
        ));
    }
}
