//! Commanded robot state
//!
//! The firmware has no per-servo or per-light update, so the full buffer is
//! resent every time a single slot changes. These buffers are that state,
//! kept in wire layout.

use crate::domain::models::{LightColor, ServoId};
use crate::domain::wire::{
    self, CHEST_LIGHT_BUFFER_LEN, CHEST_LIGHT_TAG, SERVO_BUFFER_LEN, SERVO_LIGHT_BUFFER_LEN,
    SERVO_LIGHT_TAG, SERVO_MIDPOINT, SERVO_TAG,
};
use crate::error::{Result, RobotError};
use tracing::trace;

/// Arms at rest
const SERVO_REST: [u8; SERVO_BUFFER_LEN] = [
    SERVO_TAG, //
    0x7f, 0x80, 0x00, 0xff, 0x80, 0x7f, 0x7f, 0x7f, //
    0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
];

const SERVO_LIGHT_REST: [u8; SERVO_LIGHT_BUFFER_LEN] = [
    SERVO_LIGHT_TAG, //
    0x00, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04, //
    0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x00,
];

const CHEST_LIGHT_REST: [u8; CHEST_LIGHT_BUFFER_LEN] = {
    let mut buffer = [0u8; CHEST_LIGHT_BUFFER_LEN];
    buffer[0] = CHEST_LIGHT_TAG;
    buffer
};

/// Number of addressable chest lights
pub const CHEST_LIGHT_COUNT: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotState {
    servos: [u8; SERVO_BUFFER_LEN],
    servo_lights: [u8; SERVO_LIGHT_BUFFER_LEN],
    chest_lights: [u8; CHEST_LIGHT_BUFFER_LEN],
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            servos: SERVO_REST,
            servo_lights: SERVO_LIGHT_REST,
            chest_lights: CHEST_LIGHT_REST,
        }
    }
}

impl RobotState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn servos(&self) -> &[u8; SERVO_BUFFER_LEN] {
        &self.servos
    }

    pub fn servo_lights(&self) -> &[u8; SERVO_LIGHT_BUFFER_LEN] {
        &self.servo_lights
    }

    pub fn chest_lights(&self) -> &[u8; CHEST_LIGHT_BUFFER_LEN] {
        &self.chest_lights
    }

    /// Stored (post-reflection) position of a servo
    pub fn servo_position(&self, servo: ServoId) -> u8 {
        self.servos[servo.offset()]
    }

    /// Set a servo position, returning the byte actually stored
    ///
    /// The value is capped to a byte. Mirrored axes store `0xff - value`
    /// unless the value is the midpoint.
    pub fn set_servo(&mut self, servo: i32, value: i32) -> Result<u8> {
        let servo = ServoId::try_from(servo)?;
        let mut value = wire::cap(value);

        if servo.is_mirrored() && value != SERVO_MIDPOINT {
            value = 0xff - value;
        }

        trace!(?servo, value, "Servo position updated");
        self.servos[servo.offset()] = value;
        Ok(value)
    }

    /// Set a servo light from its colour name
    pub fn set_servo_light(&mut self, servo: i32, color: &str) -> Result<LightColor> {
        let color: LightColor = color.parse()?;
        let servo = ServoId::try_from(servo)?;

        trace!(?servo, ?color, "Servo light updated");
        self.servo_lights[servo.offset()] = color.code();
        Ok(color)
    }

    pub fn set_chest_light(&mut self, light: i32, on: bool) -> Result<()> {
        if !(0..CHEST_LIGHT_COUNT).contains(&light) {
            return Err(RobotError::InvalidLightIndex(light));
        }

        trace!(light, on, "Chest light updated");
        self.chest_lights[light as usize + 1] = u8::from(on);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_state() {
        let state = RobotState::new();
        assert_eq!(state.servos()[0], SERVO_TAG);
        assert_eq!(state.servo_lights()[0], SERVO_LIGHT_TAG);
        assert_eq!(state.chest_lights()[0], CHEST_LIGHT_TAG);
        assert_eq!(state.servo_position(ServoId::Unknown0), 0x7f);
        assert_eq!(state.servo_position(ServoId::RightElbow), 0x80);
        assert_eq!(state.servo_position(ServoId::RightShoulder), 0x00);
        assert_eq!(state.servo_position(ServoId::LeftShoulder), 0xff);
        assert_eq!(state.servo_position(ServoId::LeftElbow), 0x80);
        assert_eq!(state.servo_position(ServoId::Unknown7), 0x7f);
        assert!(state.servos()[9..].iter().all(|&b| b == 0x01));
        assert!(state.chest_lights()[1..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_plain_servos_store_capped_value() {
        let plain = [
            ServoId::Unknown0,
            ServoId::RightShoulder,
            ServoId::LeftElbow,
            ServoId::Unknown5,
            ServoId::Unknown6,
            ServoId::Unknown7,
        ];
        for servo in plain {
            for value in [-1000, -1, 0, 1, 0x7f, 0x80, 200, 255, 256, 1000] {
                let mut state = RobotState::new();
                let stored = state.set_servo(servo as i32, value).unwrap();
                assert_eq!(stored, wire::cap(value));
                assert_eq!(state.servo_position(servo), wire::cap(value));
            }
        }
    }

    #[test]
    fn test_mirrored_servos_reflect_except_midpoint() {
        for servo in [ServoId::LeftShoulder, ServoId::RightElbow] {
            let mut state = RobotState::new();
            assert_eq!(state.set_servo(servo as i32, 0x10).unwrap(), 0xef);
            assert_eq!(state.set_servo(servo as i32, -5).unwrap(), 0xff);
            assert_eq!(state.set_servo(servo as i32, 999).unwrap(), 0x00);
            assert_eq!(state.set_servo(servo as i32, 0x7f).unwrap(), 0x80);
            assert_eq!(state.set_servo(servo as i32, 0x80).unwrap(), 0x80);
            assert_eq!(state.servo_position(servo), 0x80);
        }
    }

    #[test]
    fn test_set_servo_leaves_other_slots() {
        let mut state = RobotState::new();
        state.set_servo(ServoId::LeftElbow as i32, 0x20).unwrap();

        let mut expected = SERVO_REST;
        expected[5] = 0x20;
        assert_eq!(state.servos(), &expected);
    }

    #[test]
    fn test_bad_servo_index_does_not_mutate() {
        let mut state = RobotState::new();
        assert_eq!(state.set_servo(8, 10), Err(RobotError::InvalidServoIndex(8)));
        assert_eq!(state.set_servo(-1, 10), Err(RobotError::InvalidServoIndex(-1)));
        assert_eq!(state, RobotState::new());
    }

    #[test]
    fn test_servo_light() {
        let mut state = RobotState::new();
        state.set_servo_light(3, "blue").unwrap();
        state.set_servo_light(0, "magenta").unwrap();

        let mut expected = SERVO_LIGHT_REST;
        expected[4] = 0x04;
        expected[1] = 0x05;
        assert_eq!(state.servo_lights(), &expected);
    }

    #[test]
    fn test_servo_light_errors() {
        let mut state = RobotState::new();
        assert_eq!(
            state.set_servo_light(8, "red"),
            Err(RobotError::InvalidServoIndex(8))
        );
        assert_eq!(
            state.set_servo_light(2, "purple"),
            Err(RobotError::InvalidColor("purple".into()))
        );
        assert_eq!(state, RobotState::new());
    }

    #[test]
    fn test_chest_lights() {
        let mut state = RobotState::new();
        state.set_chest_light(0, true).unwrap();
        state.set_chest_light(3, true).unwrap();
        state.set_chest_light(3, false).unwrap();

        assert_eq!(&state.chest_lights()[..5], &[CHEST_LIGHT_TAG, 1, 0, 0, 0]);
        assert_eq!(
            state.set_chest_light(4, true),
            Err(RobotError::InvalidLightIndex(4))
        );
        assert_eq!(
            state.set_chest_light(-1, true),
            Err(RobotError::InvalidLightIndex(-1))
        );
    }
}
