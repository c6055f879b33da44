//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};

/// GEM slow control CLI
#[derive(Parser, Debug)]
#[command(name = "gemctl")]
#[command(version, about = "GEM slow control CLI", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// High-voltage supply commands
    Hv {
        /// Serial device of the HV digital interface
        #[arg(short, long, default_value = "/dev/ttyUSB0")]
        port: String,

        #[command(subcommand)]
        command: HvCommands,
    },

    /// Linear-actuator motor commands
    Motor {
        /// Serial device of the motor controller
        #[arg(short, long, default_value = "/dev/ttyACM1")]
        port: String,

        #[command(subcommand)]
        command: MotorCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum HvCommands {
    /// Show ramp settings, setpoints and measured output
    Status,

    /// Set the output voltage setpoint
    SetVoltage {
        /// Voltage in volts (0-6000)
        volts: i32,
    },

    /// Set the output current setpoint
    SetCurrent {
        /// Current in microamps (0-10000)
        microamps: i32,
    },

    /// Show or change the host-side ramp rates
    Ramp {
        /// New ramp-up rate in V/s
        #[arg(long)]
        up: Option<u32>,

        /// New ramp-down rate in V/s
        #[arg(long)]
        down: Option<u32>,
    },

    /// Activate the output
    On,

    /// Deactivate the output
    Off,

    /// Show the digital interface firmware version
    Version,

    /// Show the serial number of the supply
    SerialNumber,

    /// Reset the digital interface; clears all setpoints
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum MotorCommands {
    /// Move the actuator to a step position and wait for convergence
    MoveTo {
        /// Target position in steps (140-3610, ~26.5 steps/mm)
        steps: u16,

        /// Abort if the move has not converged after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Read the current position
    Position,

    /// Read the controller fault status and position
    Status,

    /// Stop the motor immediately
    Stop,

    /// Move the actuator to the home position (step 140)
    Home {
        /// Abort if homing has not converged after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}
