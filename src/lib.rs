//! Control client for the Meccanoid toy robot over Bluetooth LE.
//!
//! [`RobotService`] keeps the robot's commanded state (servo positions,
//! servo lights, chest lights) and writes checksummed command frames to the
//! robot through any [`BleTransport`].

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::models::{AppEvent, ConnectionStatus, LightColor, ServoId};
pub use domain::robot_state::RobotState;
pub use domain::settings::{Settings, SettingsService};
pub use error::{RobotError, TransportError};
pub use infrastructure::bluetooth::simulated::SimulatedTransport;
#[cfg(windows)]
pub use infrastructure::bluetooth::winrt::WinRtTransport;
pub use infrastructure::bluetooth::{BleLink, BleTransport, ConnectionConfig, RobotService};
