use crate::error::RobotError;
use std::str::FromStr;

/// Servo positions on the robot
///
/// Slots 0, 5, 6 and 7 exist in the protocol but have no known joint yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServoId {
    Unknown0 = 0,
    RightElbow = 1,
    RightShoulder = 2,
    LeftShoulder = 3,
    LeftElbow = 4,
    Unknown5 = 5,
    Unknown6 = 6,
    Unknown7 = 7,
}

impl ServoId {
    pub const ALL: [ServoId; 8] = [
        Self::Unknown0,
        Self::RightElbow,
        Self::RightShoulder,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::Unknown5,
        Self::Unknown6,
        Self::Unknown7,
    ];

    /// Byte offset of this servo inside a servo or servo-light buffer
    pub fn offset(self) -> usize {
        self as usize + 1
    }

    /// Servos mounted back to front, whose values get reflected
    pub fn is_mirrored(self) -> bool {
        matches!(self, Self::LeftShoulder | Self::RightElbow)
    }
}

impl TryFrom<i32> for ServoId {
    type Error = RobotError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(RobotError::InvalidServoIndex(index))
    }
}

/// Palette used by the servo lights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LightColor {
    Off = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl LightColor {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl FromStr for LightColor {
    type Err = RobotError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "black" | "off" => Ok(Self::Off),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "blue" => Ok(Self::Blue),
            "magenta" => Ok(Self::Magenta),
            "cyan" => Ok(Self::Cyan),
            "white" | "on" => Ok(Self::White),
            _ => Err(RobotError::InvalidColor(name.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConnectionStatus(ConnectionStatus),
    LogMessage(StatusMessage),
    /// A complete frame (checksum included) was written to the robot
    FrameSent(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_id_bounds() {
        assert_eq!(ServoId::try_from(0).unwrap(), ServoId::Unknown0);
        assert_eq!(ServoId::try_from(3).unwrap(), ServoId::LeftShoulder);
        assert_eq!(ServoId::try_from(7).unwrap(), ServoId::Unknown7);
        assert_eq!(ServoId::try_from(8), Err(RobotError::InvalidServoIndex(8)));
        assert_eq!(ServoId::try_from(-1), Err(RobotError::InvalidServoIndex(-1)));
    }

    #[test]
    fn test_mirrored_servos() {
        let mirrored: Vec<_> = ServoId::ALL.iter().filter(|s| s.is_mirrored()).collect();
        assert_eq!(mirrored, vec![&ServoId::RightElbow, &ServoId::LeftShoulder]);
        assert_eq!(ServoId::RightElbow.offset(), 2);
    }

    #[test]
    fn test_color_names() {
        assert_eq!("off".parse::<LightColor>().unwrap().code(), 0);
        assert_eq!("black".parse::<LightColor>().unwrap().code(), 0);
        assert_eq!("yellow".parse::<LightColor>().unwrap().code(), 3);
        assert_eq!("cyan".parse::<LightColor>().unwrap().code(), 6);
        assert_eq!("on".parse::<LightColor>().unwrap(), LightColor::White);
        assert_eq!(
            "Blue".parse::<LightColor>(),
            Err(RobotError::InvalidColor("Blue".into()))
        );
    }
}
