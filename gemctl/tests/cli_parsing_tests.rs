//! CLI argument parsing tests for gemctl
//!
//! These run without hardware: they only verify that the documented
//! command surface parses into the expected structures.

use clap::Parser;
use gemctl::cli::{Cli, Commands, HvCommands, MotorCommands, OutputFormat};

#[test]
fn test_hv_set_voltage_parses() {
    let cli = Cli::try_parse_from(["gemctl", "hv", "set-voltage", "3000"]).unwrap();

    match cli.command {
        Commands::Hv { port, command } => {
            assert_eq!(port, "/dev/ttyUSB0");
            assert!(matches!(command, HvCommands::SetVoltage { volts: 3000 }));
        }
        _ => panic!("Expected hv subcommand"),
    }
}

#[test]
fn test_hv_port_override() {
    let cli = Cli::try_parse_from(["gemctl", "hv", "--port", "/dev/ttyUSB3", "status"]).unwrap();

    match cli.command {
        Commands::Hv { port, command } => {
            assert_eq!(port, "/dev/ttyUSB3");
            assert!(matches!(command, HvCommands::Status));
        }
        _ => panic!("Expected hv subcommand"),
    }
}

#[test]
fn test_hv_full_surface_parses() {
    for args in [
        vec!["gemctl", "hv", "status"],
        vec!["gemctl", "hv", "set-voltage", "0"],
        vec!["gemctl", "hv", "set-current", "10000"],
        vec!["gemctl", "hv", "ramp"],
        vec!["gemctl", "hv", "ramp", "--up", "60", "--down", "40"],
        vec!["gemctl", "hv", "on"],
        vec!["gemctl", "hv", "off"],
        vec!["gemctl", "hv", "version"],
        vec!["gemctl", "hv", "serial-number"],
        vec!["gemctl", "hv", "reset"],
    ] {
        assert!(
            Cli::try_parse_from(args.iter().copied()).is_ok(),
            "failed to parse: {:?}",
            args
        );
    }
}

#[test]
fn test_motor_move_to_with_timeout() {
    let cli =
        Cli::try_parse_from(["gemctl", "motor", "move-to", "2000", "--timeout", "120"]).unwrap();

    match cli.command {
        Commands::Motor { port, command } => {
            assert_eq!(port, "/dev/ttyACM1");
            match command {
                MotorCommands::MoveTo { steps, timeout } => {
                    assert_eq!(steps, 2000);
                    assert_eq!(timeout, Some(120));
                }
                _ => panic!("Expected move-to"),
            }
        }
        _ => panic!("Expected motor subcommand"),
    }
}

#[test]
fn test_motor_full_surface_parses() {
    for args in [
        vec!["gemctl", "motor", "move-to", "140"],
        vec!["gemctl", "motor", "position"],
        vec!["gemctl", "motor", "status"],
        vec!["gemctl", "motor", "stop"],
        vec!["gemctl", "motor", "home"],
        vec!["gemctl", "motor", "home", "--timeout", "60"],
    ] {
        assert!(
            Cli::try_parse_from(args.iter().copied()).is_ok(),
            "failed to parse: {:?}",
            args
        );
    }
}

#[test]
fn test_motor_step_target_must_be_u16() {
    // 70000 does not fit the step argument type
    assert!(Cli::try_parse_from(["gemctl", "motor", "move-to", "70000"]).is_err());
    assert!(Cli::try_parse_from(["gemctl", "motor", "move-to", "abc"]).is_err());
}

#[test]
fn test_format_flag() {
    let cli = Cli::try_parse_from(["gemctl", "--format", "json", "motor", "position"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Json);

    let cli = Cli::try_parse_from(["gemctl", "motor", "position"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Table);
}

#[test]
fn test_completion_parses() {
    let cli = Cli::try_parse_from(["gemctl", "completion", "bash"]).unwrap();
    assert!(matches!(cli.command, Commands::Completion { .. }));
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["gemctl", "hvac", "status"]).is_err());
}
