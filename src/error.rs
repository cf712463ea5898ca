//! Error types for robot control and the BLE transport.

use thiserror::Error;

/// Errors raised by the BLE transport capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link is closed or the peripheral went away
    #[error("Device not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("GATT error: {0}")]
    Gatt(String),

    #[error("Invalid Bluetooth address: {0}")]
    InvalidAddress(String),
}

/// Errors surfaced by [`RobotService`](crate::RobotService) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RobotError {
    #[error("Not connected to the robot")]
    NotConnected,

    #[error("Bad servo index: {0}")]
    InvalidServoIndex(i32),

    #[error("Bad light index: {0}")]
    InvalidLightIndex(i32),

    #[error("Unknown colour for servo: \"{0}\"")]
    InvalidColor(String),

    /// Any transport failure other than a lost link
    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for RobotError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => RobotError::NotConnected,
            other => RobotError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RobotError>;
