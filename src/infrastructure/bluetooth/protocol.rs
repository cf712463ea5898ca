//! Meccanoid Wire Protocol
//!
//! Every command is a tagged byte body followed by a 16-bit checksum,
//! written to a single GATT characteristic.
//!
//! ```text
//! [0]       : Tag byte (command type)
//! [1..n]    : Command body
//! [n], [n+1]: Checksum high, low (sum of all preceding bytes, mod 2^16)
//! ```

use tracing::trace;

pub use crate::domain::wire::{
    cap, parse_address, CHEST_LIGHT_BUFFER_LEN, CHEST_LIGHT_TAG, COMMAND_HANDLE, DEFAULT_ADDRESS,
    SERVO_BUFFER_LEN, SERVO_LIGHT_BUFFER_LEN, SERVO_LIGHT_TAG, SERVO_MIDPOINT, SERVO_TAG,
};

pub const MOVE_TAG: u8 = 0x0d;
pub const EYE_LIGHT_TAG: u8 = 0x11;

/// Body length of the move, eye-light and wake commands
pub const ONE_SHOT_LEN: usize = 18;

/// Wheel direction bytes
pub const FORWARD: u8 = 0x01;
pub const BACKWARD: u8 = 0x02;

/// Makes the robot yawn, say "I'm awake" and waggle its arms
pub const WAKE_SEQUENCE: [u8; ONE_SHOT_LEN] = [
    0x19, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d, 0x1d,
    0x1d, 0x1d, 0x1d,
];

/// Highest value of an eye-light channel
pub const EYE_CHANNEL_MAX: i32 = 0x07;

/// 16-bit wrapping sum of all bytes
pub fn checksum(payload: &[u8]) -> u16 {
    payload
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Append the big-endian checksum to a payload
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&checksum(payload).to_be_bytes());
    frame
}

/// Commands understood by the robot firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Wake-up greeting sent once per connection
    Wake,
    /// Full servo position buffer
    Servos([u8; SERVO_BUFFER_LEN]),
    /// Full servo light buffer
    ServoLights([u8; SERVO_LIGHT_BUFFER_LEN]),
    /// Full chest light buffer
    ChestLights([u8; CHEST_LIGHT_BUFFER_LEN]),
    /// Wheel speeds in [-255, 255], negative meaning backwards
    Move { right: i32, left: i32 },
    /// Eye colour, each channel in [0, 7]
    EyeLights { r: i32, g: i32, b: i32 },
}

impl Command {
    /// Encode the command body (without checksum)
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Self::Wake => WAKE_SEQUENCE.to_vec(),
            Self::Servos(buffer) => buffer.to_vec(),
            Self::ServoLights(buffer) => buffer.to_vec(),
            Self::ChestLights(buffer) => buffer.to_vec(),
            Self::Move { right, left } => encode_move(right, left).to_vec(),
            Self::EyeLights { r, g, b } => encode_eye_lights(r, g, b).to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wake => "wake",
            Self::Servos(_) => "servos",
            Self::ServoLights(_) => "servo lights",
            Self::ChestLights(_) => "chest lights",
            Self::Move { .. } => "move",
            Self::EyeLights { .. } => "eye lights",
        }
    }
}

/// Direction and magnitude for one wheel
///
/// Zero counts as backward: only strictly positive speeds drive forward.
fn wheel(speed: i32) -> (u8, u8) {
    if speed > 0 {
        (FORWARD, cap(speed))
    } else {
        (BACKWARD, cap(speed.saturating_neg()))
    }
}

/// Build the move body
///
/// ```text
/// [0]    : 0x0d
/// [1]    : Left direction
/// [2]    : Right direction
/// [3]    : Left magnitude
/// [4]    : Right magnitude
/// [5-6]  : 0xff 0xff
/// [7-17] : Zero
/// ```
pub fn encode_move(right_speed: i32, left_speed: i32) -> [u8; ONE_SHOT_LEN] {
    let (right_dir, right_mag) = wheel(right_speed);
    let (left_dir, left_mag) = wheel(left_speed);
    trace!(right_dir, right_mag, left_dir, left_mag, "Encoding move");

    let mut body = [0u8; ONE_SHOT_LEN];
    body[..7].copy_from_slice(&[MOVE_TAG, left_dir, right_dir, left_mag, right_mag, 0xff, 0xff]);
    body
}

/// Build the eye-light body
///
/// ```text
/// [0]    : 0x11
/// [1-2]  : Zero
/// [3]    : g << 3 | r
/// [4]    : b
/// [5-17] : Zero
/// ```
pub fn encode_eye_lights(r: i32, g: i32, b: i32) -> [u8; ONE_SHOT_LEN] {
    let r = r.clamp(0, EYE_CHANNEL_MAX) as u8;
    let g = g.clamp(0, EYE_CHANNEL_MAX) as u8;
    let b = b.clamp(0, EYE_CHANNEL_MAX) as u8;

    let mut body = [0u8; ONE_SHOT_LEN];
    body[0] = EYE_LIGHT_TAG;
    body[3] = g << 3 | r;
    body[4] = b;
    body
}

/// Hex dump used in frame logs
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
