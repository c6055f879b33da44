//! GEM slow control CLI library
//!
//! The binary in `main.rs` is a thin wrapper around this crate: command
//! definitions and handlers live in [`cli`], output rendering in
//! [`format`]. All device logic stays in `gemctl-hardware`.

pub mod cli;
pub mod format;
