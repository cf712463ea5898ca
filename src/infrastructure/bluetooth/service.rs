//! Robot Service Module
//!
//! Owns the link to the robot and its commanded state. Every command goes
//! through [`RobotService::transmit`], which appends the checksum and
//! writes the frame to the command characteristic.

use crate::domain::models::{AppEvent, ConnectionStatus, MessageSeverity, StatusMessage};
use crate::domain::robot_state::RobotState;
use crate::domain::settings::Settings;
use crate::error::{Result, RobotError, TransportError};
use crate::infrastructure::bluetooth::protocol::{self, Command};
use crate::infrastructure::bluetooth::{BleLink, BleTransport};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Configuration for connection behavior
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Address used by [`RobotService::connect_default`]
    pub address: String,
    /// Characteristic handle commands are written to
    pub command_handle: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: protocol::DEFAULT_ADDRESS.to_string(),
            command_handle: protocol::COMMAND_HANDLE,
        }
    }
}

impl From<&Settings> for ConnectionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            address: settings.device_address.clone(),
            command_handle: settings.command_handle,
        }
    }
}

/// Main service coordinating all robot commands
pub struct RobotService<T: BleTransport> {
    transport: T,
    link: Option<T::Link>,
    state: RobotState,
    config: ConnectionConfig,
    event_sender: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl<T: BleTransport> RobotService<T> {
    /// Create a disconnected service with the robot at rest
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        Self {
            transport,
            link: None,
            state: RobotState::new(),
            config,
            event_sender: None,
        }
    }

    /// Report connection changes and sent frames on `sender`
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Connect to the configured address
    pub async fn connect_default(&mut self) -> Result<()> {
        let address = self.config.address.clone();
        self.connect(&address).await
    }

    /// Connect to the robot and bring it to life
    ///
    /// Does nothing if already connected. After the link is up the robot is
    /// sent a stopped move (so it notices us), the wake sequence, the servo
    /// buffer and blue eyes.
    pub async fn connect(&mut self, address: &str) -> Result<()> {
        if self.is_connected() {
            debug!("Already connected, ignoring connect to {}", address);
            return Ok(());
        }

        info!("Connecting to Meccanoid at {}", address);
        self.send_status(ConnectionStatus::Connecting);

        let link = match self.transport.connect(address).await {
            Ok(link) => link,
            Err(e) => {
                error!("Failed to connect to {}: {}", address, e);
                self.send_status(ConnectionStatus::Error);
                self.send_log(&format!("Connection failed: {}", e), MessageSeverity::Error);
                return Err(e.into());
            }
        };
        self.link = Some(link);

        if let Err(e) = self.send_greeting().await {
            warn!("Wake-up sequence failed: {}", e);
            if let Some(mut link) = self.link.take() {
                link.disconnect().await;
            }
            self.send_status(ConnectionStatus::Disconnected);
            return Err(RobotError::NotConnected);
        }

        info!("Connected to Meccanoid at {}", address);
        self.send_status(ConnectionStatus::Connected);
        self.send_log("Meccanoid is awake", MessageSeverity::Success);
        Ok(())
    }

    async fn send_greeting(&mut self) -> Result<()> {
        self.move_wheels(0, 0).await?;
        self.send(Command::Wake).await?;
        self.send(Command::Servos(*self.state.servos())).await?;
        self.set_eye_lights(0x0, 0x0, 0x7).await
    }

    /// Disconnect from the robot; a no-op when not connected
    pub async fn disconnect(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };
        link.disconnect().await;

        info!("Disconnected from Meccanoid");
        self.send_log("Disconnected from device", MessageSeverity::Info);
        self.send_status(ConnectionStatus::Disconnected);
    }

    /// Set a servo position in [0, 255] and resend all servo positions
    pub async fn set_servo(&mut self, servo: i32, value: i32) -> Result<()> {
        self.state.set_servo(servo, value)?;
        self.send(Command::Servos(*self.state.servos())).await
    }

    /// Set a servo light by colour name and resend all servo lights
    pub async fn set_servo_light(&mut self, servo: i32, color: &str) -> Result<()> {
        self.state.set_servo_light(servo, color)?;
        self.send(Command::ServoLights(*self.state.servo_lights())).await
    }

    /// Switch one of the four chest lights and resend all of them
    pub async fn set_chest_light(&mut self, light: i32, on: bool) -> Result<()> {
        self.state.set_chest_light(light, on)?;
        self.send(Command::ChestLights(*self.state.chest_lights())).await
    }

    /// Drive the wheels, speeds in [-255, 255] with negative meaning backwards
    pub async fn move_wheels(&mut self, right_speed: i32, left_speed: i32) -> Result<()> {
        self.send(Command::Move {
            right: right_speed,
            left: left_speed,
        })
        .await
    }

    /// Set the eye colour, each channel in [0, 7]
    pub async fn set_eye_lights(&mut self, r: i32, g: i32, b: i32) -> Result<()> {
        self.send(Command::EyeLights { r, g, b }).await
    }

    async fn send(&mut self, command: Command) -> Result<()> {
        debug!("Sending {} command", command.name());
        self.transmit(&command.encode()).await
    }

    /// Checksum `payload` and write it to the command characteristic
    ///
    /// A lost link marks the service disconnected before the error is
    /// returned.
    pub async fn transmit(&mut self, payload: &[u8]) -> Result<()> {
        let Some(link) = self.link.as_mut() else {
            return Err(RobotError::NotConnected);
        };

        let frame = protocol::frame(payload);
        debug!("Writing frame: {}", protocol::hex(&frame));

        let result = link
            .write_characteristic(self.config.command_handle, &frame)
            .await;

        match result {
            Ok(()) => {
                self.send_event(AppEvent::FrameSent(frame));
                Ok(())
            }
            Err(TransportError::NotConnected) => {
                warn!("Lost connection to Meccanoid");
                self.link = None;
                self.send_log("Connection to device lost", MessageSeverity::Warning);
                self.send_status(ConnectionStatus::Disconnected);
                Err(RobotError::NotConnected)
            }
            Err(e) => {
                error!("Write failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn send_status(&self, status: ConnectionStatus) {
        self.send_event(AppEvent::ConnectionStatus(status));
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        self.send_event(AppEvent::LogMessage(StatusMessage {
            message: message.to_string(),
            severity,
        }));
    }

    fn send_event(&self, event: AppEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}
