//! Device profiles for the two instruments on the test stand
//!
//! Each instrument implements the `DeviceProfile` trait with its serial
//! parameters. Both devices happen to share the same line settings, but the
//! profiles keep them apart at the type level so an `HvSupply` cannot be
//! opened on the motor's session type by accident.
//!
//! Note: Actual serial I/O lives in the `gemctl-hardware` crate. This module
//! only contains the device specifications.

/// Serial device configuration trait
///
/// # Example
///
/// ```
/// use gemctl_core::device::{DeviceProfile, HeinzingerPnc6000};
///
/// const BAUD: u32 = HeinzingerPnc6000::BAUD_RATE;
/// const NAME: &str = HeinzingerPnc6000::NAME;
/// ```
pub trait DeviceProfile: Send + Sync + 'static {
    /// Human-readable device name
    const NAME: &'static str;

    /// Serial communication baud rate
    const BAUD_RATE: u32;

    /// Overall read timeout in milliseconds
    const READ_TIMEOUT_MS: u64;

    /// Inter-character timeout in milliseconds
    ///
    /// Once the first reply byte has arrived, the line is considered quiet
    /// after this much silence.
    const INTER_CHAR_TIMEOUT_MS: u64;

    /// Device path the instrument usually enumerates at on the stand
    const DEFAULT_PORT: &'static str;
}

/// Heinzinger PNC 6000-10 high-voltage supply, behind its Digital Interface II
///
/// ASCII command protocol, newline-terminated. 6 kV / 10 mA rated output.
pub struct HeinzingerPnc6000;

impl DeviceProfile for HeinzingerPnc6000 {
    const NAME: &'static str = "Heinzinger PNC 6000-10 (Digital Interface II)";
    const BAUD_RATE: u32 = 9600;
    const READ_TIMEOUT_MS: u64 = 500;
    const INTER_CHAR_TIMEOUT_MS: u64 = 5;
    const DEFAULT_PORT: &'static str = "/dev/ttyUSB0";
}

/// Pololu Jrk 21v3 motor controller driving the Concentric LACT6P actuator
///
/// Binary protocol: single-byte opcodes, optional single argument byte,
/// two-byte little-endian replies for position and status queries.
pub struct PololuJrk21v3;

impl DeviceProfile for PololuJrk21v3 {
    const NAME: &'static str = "Pololu Jrk 21v3 (Concentric LACT6P actuator)";
    const BAUD_RATE: u32 = 9600;
    const READ_TIMEOUT_MS: u64 = 500;
    const INTER_CHAR_TIMEOUT_MS: u64 = 5;
    const DEFAULT_PORT: &'static str = "/dev/ttyACM1";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hv_profile() {
        assert_eq!(HeinzingerPnc6000::BAUD_RATE, 9600);
        assert_eq!(HeinzingerPnc6000::READ_TIMEOUT_MS, 500);
        assert_eq!(HeinzingerPnc6000::INTER_CHAR_TIMEOUT_MS, 5);
        assert_eq!(HeinzingerPnc6000::DEFAULT_PORT, "/dev/ttyUSB0");
    }

    #[test]
    fn test_motor_profile() {
        assert_eq!(PololuJrk21v3::BAUD_RATE, 9600);
        assert_eq!(PololuJrk21v3::DEFAULT_PORT, "/dev/ttyACM1");
        assert!(PololuJrk21v3::NAME.contains("Jrk"));
    }
}
