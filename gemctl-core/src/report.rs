//! Status report types consumed by the CLI

use serde::Serialize;

use crate::types::{LinkState, MotorStatus};

/// One-shot status report of the HV supply
///
/// Setpoints and measured values are the device's own reply strings; the
/// supply reports volts and microamps as decimal text.
#[derive(Debug, Clone, Serialize)]
pub struct HvReport {
    /// Device name
    pub device: String,
    /// Serial port the report was taken from
    pub port: Option<String>,
    /// Link state after taking the report
    pub link: LinkState,
    /// Host-side ramp-up rate in V/s
    pub ramp_up: u32,
    /// Host-side ramp-down rate in V/s
    pub ramp_down: u32,
    /// Voltage setpoint as reported by the device
    pub voltage_setpoint: String,
    /// Current setpoint as reported by the device
    pub current_setpoint: String,
    /// Measured output voltage
    pub measured_voltage: String,
    /// Measured output current
    pub measured_current: String,
}

/// One-shot status report of the motor controller
#[derive(Debug, Clone, Serialize)]
pub struct MotorReport {
    /// Device name
    pub device: String,
    /// Serial port the report was taken from
    pub port: Option<String>,
    /// Decoded controller status
    pub status: MotorStatus,
    /// Raw step count
    pub steps: u16,
    /// Calibrated position label
    pub position: String,
}
