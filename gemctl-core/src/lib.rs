//! GEM Slow Control Core Library
//!
//! Shared types, device profiles, limits and calibration for the GEM slow
//! control project. This crate is used by the hardware and CLI crates.

pub mod device;
pub mod error;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use device::*;
pub use error::*;
pub use types::*;
