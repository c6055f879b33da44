//! gemctl-hardware
//!
//! Hardware abstraction crate for the GEM slow control stand: the low-level
//! serial link plus the two device controllers. This crate is intended to be
//! used by the CLI crate (or any other frontend) to talk to the instruments.
//
//! Public API:
//! - `hv_supply::HvSupply`: high-level controller for the HV supply
//! - `motor_drive::MotorDrive`: high-level controller for the actuator motor
//! - `serial_link::SerialSession`: low-level serial I/O session
//! - `mock::MockLink`: scripted transport for tests

pub mod hv_supply;
pub mod mock;
pub mod motor_drive;
pub mod serial_link;

pub use hv_supply::{HvCommand, HvSupply};
pub use mock::MockLink;
pub use motor_drive::{ConvergenceConfig, MotorDrive, MotorOpcode};
pub use serial_link::{SerialLink, SerialSession};
