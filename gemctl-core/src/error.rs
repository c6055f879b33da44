//! Error types for the GEM slow control system

use thiserror::Error;

/// Core error type for slow control operations
#[derive(Error, Debug)]
pub enum GemError {
    /// Serial port could not be opened or the connect handshake failed
    #[error("Connect error: {0}")]
    Connect(String),

    /// Operation attempted while the link is not in the Connected state
    #[error("Device not ready; reconnect required")]
    NotReady,

    /// Serial port errors (failed write or read)
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Device disconnected (EOF on the line, USB unplugged)
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// The read itself succeeded but the device sent no usable reply
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Requested value outside the device limits
    #[error("{quantity} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        quantity: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Reply could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for slow control operations
pub type Result<T> = std::result::Result<T, GemError>;
