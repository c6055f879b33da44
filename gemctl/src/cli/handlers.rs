//! Command execution handlers

use std::time::Duration;

use anyhow::Result;
use clap::CommandFactory;
use gemctl_core::report::{HvReport, MotorReport};
use gemctl_hardware::{ConvergenceConfig, HvSupply, MotorDrive};
use tracing::debug;

use super::commands::{Cli, HvCommands, MotorCommands, OutputFormat};
use crate::format;

/// Handle `gemctl hv ...`
pub async fn handle_hv(port: &str, command: HvCommands, format: &OutputFormat) -> Result<()> {
    debug!("Connecting to HV supply on {}", port);
    let mut hv = HvSupply::connect(port)?;

    match command {
        HvCommands::Status => {
            let voltage_setpoint = hv.voltage_setpoint().await?;
            let current_setpoint = hv.current_setpoint().await?;
            let measured_voltage = hv.measure_voltage().await?;
            let measured_current = hv.measure_current().await?;

            let report = HvReport {
                device: hv.device_name().to_string(),
                port: hv.port_path().map(str::to_string),
                link: hv.state(),
                ramp_up: hv.ramp_up(),
                ramp_down: hv.ramp_down(),
                voltage_setpoint,
                current_setpoint,
                measured_voltage,
                measured_current,
            };
            println!("{}", format::format_hv_report(&report, format)?);
        }
        HvCommands::SetVoltage { volts } => {
            hv.set_voltage(volts).await?;
            println!(
                "{}",
                format::format_success(&format!("Voltage setpoint {} V sent", volts))
            );
        }
        HvCommands::SetCurrent { microamps } => {
            hv.set_current(microamps).await?;
            println!(
                "{}",
                format::format_success(&format!("Current setpoint {} uA sent", microamps))
            );
        }
        HvCommands::Ramp { up, down } => {
            if let Some(up) = up {
                hv.set_ramp_up(up);
            }
            if let Some(down) = down {
                hv.set_ramp_down(down);
            }
            match format {
                OutputFormat::Json => {
                    let response = serde_json::json!({
                        "ramp_up": hv.ramp_up(),
                        "ramp_down": hv.ramp_down(),
                    });
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Table => {
                    println!(
                        "Ramp-up: {} V/s, ramp-down: {} V/s (host-side only)",
                        hv.ramp_up(),
                        hv.ramp_down()
                    );
                }
            }
        }
        HvCommands::On => {
            hv.turn_on().await?;
            println!("{}", format::format_success("Output activated"));
        }
        HvCommands::Off => {
            hv.turn_off().await?;
            println!("{}", format::format_success("Output deactivated"));
        }
        HvCommands::Version => {
            let version = hv.version().await?;
            match format {
                OutputFormat::Json => {
                    let response = serde_json::json!({ "version": version });
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Table => println!("{}", version),
            }
        }
        HvCommands::SerialNumber => {
            let serial = hv.serial_number().await?;
            match format {
                OutputFormat::Json => {
                    let response = serde_json::json!({ "serial_number": serial });
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Table => println!("{}", serial),
            }
        }
        HvCommands::Reset => {
            hv.reset().await?;
            println!("{}", format::format_success("Interface reset"));
        }
    }

    Ok(())
}

/// Handle `gemctl motor ...`
pub async fn handle_motor(port: &str, command: MotorCommands, format: &OutputFormat) -> Result<()> {
    debug!("Connecting to motor controller on {}", port);
    let mut motor = MotorDrive::connect(port).await?;

    match command {
        MotorCommands::MoveTo { steps, timeout } => {
            apply_move_bound(&mut motor, timeout);
            motor.move_to(steps).await?;
            println!(
                "{}",
                format::format_success(&format!(
                    "Reached step {} ({})",
                    steps,
                    motor.calibration().label(steps)
                ))
            );
        }
        MotorCommands::Position => {
            let position = motor.position().await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&position)?);
                }
                OutputFormat::Table => {
                    println!("Position: {} steps ({})", position.steps, position.position);
                }
            }
        }
        MotorCommands::Status => {
            let status = motor.status().await?;
            let position = motor.position().await?;

            let report = MotorReport {
                device: motor.device_name().to_string(),
                port: motor.port_path().map(str::to_string),
                status,
                steps: position.steps,
                position: position.position,
            };
            println!("{}", format::format_motor_report(&report, format)?);
        }
        MotorCommands::Stop => {
            motor.motor_stop().await?;
            println!("{}", format::format_success("Motor stopped"));
        }
        MotorCommands::Home { timeout } => {
            apply_move_bound(&mut motor, timeout);
            motor.go_home().await?;
            println!(
                "{}",
                format::format_success(&format!(
                    "Motor at home position (step {})",
                    motor.limits().min_steps
                ))
            );
        }
    }

    Ok(())
}

fn apply_move_bound(motor: &mut MotorDrive, timeout: Option<u64>) {
    if let Some(secs) = timeout {
        motor.set_convergence(ConvergenceConfig {
            max_duration: Some(Duration::from_secs(secs)),
            ..ConvergenceConfig::default()
        });
    }
}

/// Print a completion script for the given shell to stdout
pub fn generate_completion(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
