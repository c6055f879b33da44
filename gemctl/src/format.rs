//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use gemctl_core::report::{HvReport, MotorReport};
use gemctl_core::MotorStatus;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct QuantityRow {
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn reply_cell(value: &str) -> String {
    if value.is_empty() {
        "(no reply)".dimmed().to_string()
    } else {
        value.cyan().to_string()
    }
}

/// Format an HV status report
pub fn format_hv_report(report: &HvReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            let rows = vec![
                QuantityRow {
                    quantity: "Ramp-up / ramp-down".to_string(),
                    value: format!("{} V/s / {} V/s", report.ramp_up, report.ramp_down),
                },
                QuantityRow {
                    quantity: "Voltage setpoint".to_string(),
                    value: format!("{} V", reply_cell(&report.voltage_setpoint)),
                },
                QuantityRow {
                    quantity: "Current setpoint".to_string(),
                    value: format!("{} uA", reply_cell(&report.current_setpoint)),
                },
                QuantityRow {
                    quantity: "Measured voltage".to_string(),
                    value: format!("{} V", reply_cell(&report.measured_voltage)),
                },
                QuantityRow {
                    quantity: "Measured current".to_string(),
                    value: format!("{} uA", reply_cell(&report.measured_current)),
                },
            ];

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", header(&report.device, &report.port), table))
        }
    }
}

/// Format a motor status report
pub fn format_motor_report(report: &MotorReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            let status = match report.status {
                MotorStatus::Ready => "Ready".green().to_string(),
                MotorStatus::Fault(fault) => fault.to_string().red().to_string(),
            };
            let rows = vec![
                QuantityRow {
                    quantity: "Motor status".to_string(),
                    value: status,
                },
                QuantityRow {
                    quantity: "Current position".to_string(),
                    value: format!("{} steps ({})", report.steps, report.position.cyan()),
                },
            ];

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", header(&report.device, &report.port), table))
        }
    }
}

fn header(device: &str, port: &Option<String>) -> String {
    match port {
        Some(port) => format!("{} on {}", device.bold(), port),
        None => device.bold().to_string(),
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
