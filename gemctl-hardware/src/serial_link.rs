//! Serial link for low-level instrument communication
//!
//! Provides byte-level serial I/O with bounded-timeout reads for both
//! instruments on the stand.

use async_trait::async_trait;
use gemctl_core::{DeviceProfile, GemError, Result};
use std::marker::PhantomData;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, error, warn};

/// Trait for serial transport abstraction
///
/// This trait enables testing of the device controllers without real
/// hardware by allowing mock implementations.
#[async_trait]
pub trait SerialLink: Send {
    /// Write raw bytes to the line
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read up to `max_len` bytes, waiting at most `first_byte_timeout` for
    /// the first byte
    ///
    /// Returns whatever arrived within the window. A silent line yields
    /// `Ok(vec![])`: an empty read is a valid outcome at this layer, and
    /// upstream protocol code decides what it means.
    async fn read_up_to(&mut self, max_len: usize, first_byte_timeout: Duration)
        -> Result<Vec<u8>>;

    /// Discard anything pending in the input buffer
    fn clear_input_buffer(&mut self) -> Result<()>;

    /// Path of the underlying port, if any
    fn port_path(&self) -> Option<&str>;
}

/// Serial session bound to one instrument's line parameters
pub struct SerialSession<D: DeviceProfile> {
    port: SerialStream,
    port_path: String,
    inter_char_timeout: Duration,
    write_timeout: Duration,
    _device: PhantomData<D>,
}

impl<D: DeviceProfile> SerialSession<D> {
    /// Open the serial port with the device profile's line settings (8N1)
    ///
    /// # Errors
    ///
    /// Returns `GemError::Connect` if the port cannot be opened (absent,
    /// already claimed, insufficient permissions).
    pub fn open(port_path: &str) -> Result<Self> {
        debug!("Opening serial port: {}", port_path);

        let port = tokio_serial::new(port_path, D::BAUD_RATE)
            .timeout(Duration::from_millis(D::READ_TIMEOUT_MS))
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| {
                error!("Failed to open serial port {}: {}", port_path, e);
                GemError::Connect(format!("Failed to open {}: {}", port_path, e))
            })?;

        debug!("Serial port opened: {} ({})", port_path, D::NAME);

        Ok(Self {
            port,
            port_path: port_path.to_string(),
            inter_char_timeout: Duration::from_millis(D::INTER_CHAR_TIMEOUT_MS),
            write_timeout: Duration::from_millis(D::READ_TIMEOUT_MS),
            _device: PhantomData,
        })
    }

    /// The profile's overall read timeout
    pub fn read_timeout() -> Duration {
        Duration::from_millis(D::READ_TIMEOUT_MS)
    }
}

#[async_trait]
impl<D: DeviceProfile> SerialLink for SerialSession<D> {
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        debug!("TX {}: {:02X?}", self.port_path, bytes);

        timeout(self.write_timeout, self.port.write_all(bytes))
            .await
            .map_err(|_| {
                error!("Write timeout on {}", self.port_path);
                GemError::Timeout("Write operation timed out".to_string())
            })?
            .map_err(|e| {
                error!("Write failed on {}: {}", self.port_path, e);
                GemError::Serial(format!("Write failed: {}", e))
            })?;

        // Flush to ensure data is sent
        timeout(self.write_timeout, self.port.flush())
            .await
            .map_err(|_| GemError::Timeout("Flush operation timed out".to_string()))?
            .map_err(|e| GemError::Serial(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    async fn read_up_to(
        &mut self,
        max_len: usize,
        first_byte_timeout: Duration,
    ) -> Result<Vec<u8>> {
        let mut collected = Vec::with_capacity(max_len);
        let mut chunk = [0u8; 64];
        let mut window = first_byte_timeout;

        while collected.len() < max_len {
            let want = (max_len - collected.len()).min(chunk.len());
            match timeout(window, self.port.read(&mut chunk[..want])).await {
                // Quiet line: return whatever arrived so far (possibly nothing)
                Err(_) => break,
                Ok(Ok(0)) => {
                    // EOF indicates device disconnection (USB unplugged, power loss)
                    warn!(
                        "Serial port {} returned EOF - device may have been disconnected",
                        self.port_path
                    );
                    return Err(GemError::Disconnected(
                        "serial port returned EOF".to_string(),
                    ));
                }
                Ok(Ok(n)) => {
                    collected.extend_from_slice(&chunk[..n]);
                    // After the first byte the line is quiet once the
                    // inter-character window elapses
                    window = self.inter_char_timeout;
                }
                Ok(Err(e)) => {
                    error!("Read error on {}: {}", self.port_path, e);
                    return Err(GemError::Serial(format!("Read failed: {}", e)));
                }
            }
        }

        debug!("RX {}: {:02X?}", self.port_path, collected);
        Ok(collected)
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        self.port
            .clear(tokio_serial::ClearBuffer::Input)
            .map_err(|e| {
                warn!("Failed to clear input buffer: {}", e);
                GemError::Serial(format!("Failed to clear buffer: {}", e))
            })
    }

    fn port_path(&self) -> Option<&str> {
        Some(&self.port_path)
    }
}
