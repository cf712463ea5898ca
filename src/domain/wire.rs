//! Robot addressing and buffer layout
//!
//! Constants shared by the commanded-state buffers and the command encoder.

use crate::error::TransportError;

/// Characteristic handle that accepts every command
pub const COMMAND_HANDLE: u16 = 0x001f;

/// Address of the robot this client was first paired with
pub const DEFAULT_ADDRESS: &str = "c4:be:84:d4:68:1b";

pub const SERVO_TAG: u8 = 0x08;
pub const SERVO_LIGHT_TAG: u8 = 0x0c;
pub const CHEST_LIGHT_TAG: u8 = 0x1c;

pub const SERVO_BUFFER_LEN: usize = 17;
pub const SERVO_LIGHT_BUFFER_LEN: usize = 17;
pub const CHEST_LIGHT_BUFFER_LEN: usize = 18;

/// Servo value the mirrored axes leave untouched
pub const SERVO_MIDPOINT: u8 = 0x80;

/// Clamp to a single byte
pub fn cap(value: i32) -> u8 {
    value.clamp(0x00, 0xff) as u8
}

/// Parse a colon separated address such as `c4:be:84:d4:68:1b` into its
/// 48-bit integer form
pub fn parse_address(address: &str) -> Result<u64, TransportError> {
    let invalid = || TransportError::InvalidAddress(address.to_string());

    let octets: Vec<&str> = address.trim().split(':').collect();
    if octets.len() != 6 {
        return Err(invalid());
    }

    octets.iter().try_fold(0u64, |acc, octet| {
        if octet.len() != 2 || !octet.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = u8::from_str_radix(octet, 16).map_err(|_| invalid())?;
        Ok(acc << 8 | u64::from(byte))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap() {
        for value in -1000..=1000 {
            assert_eq!(i32::from(cap(value)), value.min(255).max(0));
        }
        assert_eq!(cap(i32::MIN), 0);
        assert_eq!(cap(i32::MAX), 255);
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address(DEFAULT_ADDRESS).unwrap(), 0xc4be84d4681b);
        assert_eq!(parse_address("00:00:00:00:00:01").unwrap(), 1);
        assert!(parse_address("c4:be:84:d4:68").is_err());
        assert!(parse_address("c4:be:84:d4:68:zz").is_err());
        assert!(parse_address("c4:be:84:d4:68:+1").is_err());
        assert!(parse_address("c4:be:84:d4:68:1b0").is_err());
    }
}
