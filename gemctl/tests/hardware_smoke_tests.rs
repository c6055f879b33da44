//! Smoke tests against the real test stand
//!
//! NOTE: These tests are ignored by default because they require both
//! instruments to be connected at their usual device paths. To run them:
//! `cargo test --test hardware_smoke_tests -- --ignored`

use anyhow::Result;
use gemctl_core::{DeviceProfile, HeinzingerPnc6000, PololuJrk21v3};
use gemctl_hardware::{HvSupply, MotorDrive};

#[tokio::test]
#[ignore] // Requires the HV supply on its serial port
async fn test_hv_identity_queries() -> Result<()> {
    let mut hv = HvSupply::connect(HeinzingerPnc6000::DEFAULT_PORT)?;

    let serial = hv.serial_number().await?;
    assert!(!serial.is_empty(), "supply should report a serial number");

    let setpoint = hv.voltage_setpoint().await?;
    assert!(setpoint.parse::<f64>().is_ok(), "setpoint should be numeric");

    Ok(())
}

#[tokio::test]
#[ignore] // Requires the motor controller on its serial port
async fn test_motor_status_and_position() -> Result<()> {
    let mut motor = MotorDrive::connect(PololuJrk21v3::DEFAULT_PORT).await?;

    let status = motor.status().await?;
    assert!(status.is_ready(), "motor should be fault-free at rest");

    let position = motor.position().await?;
    let limits = motor.limits();
    assert!(position.steps >= limits.min_steps && position.steps <= limits.max_steps);

    Ok(())
}
