//! Motor drive - high-level interface over the binary opcode protocol
//!
//! Implements the Jrk wire protocol of the linear-actuator controller:
//! single-byte opcodes, an optional argument byte, and two-byte
//! little-endian replies for position and status queries. A move command
//! enters a polling loop that watches the feedback position until the
//! target is reached within tolerance.

use std::time::Duration;

use gemctl_core::{
    CalibrationCurve, DeviceProfile, GemError, LinkState, MotorFault, MotorLimits, MotorPosition,
    MotorStatus, PololuJrk21v3, Result,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::serial_link::{SerialLink, SerialSession};

/// Single-byte opcodes of the controller's wire protocol
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorOpcode {
    /// Connection handshake, sent once right after opening the port
    Init = 0xAA,
    /// Move command base; the low 5 bits of the target are added to it
    MoveTo = 0xC0,
    /// Read the error register (2-byte reply)
    ReadError = 0xB3,
    /// Read the feedback position (2-byte reply)
    GetPosition = 0xA7,
    /// Stop the motor
    Stop = 0xFF,
}

/// Settings for the position-convergence loop
#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    /// Pause between position polls
    pub poll_interval: Duration,
    /// Abort the move if it has not converged within this bound
    ///
    /// `None` polls until convergence or error, trusting the hardware to
    /// arrive eventually. A stuck actuator then polls forever; callers who
    /// cannot accept that set a bound or drop the `move_to` future.
    pub max_duration: Option<Duration>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_duration: None,
        }
    }
}

/// Motor drive controller
///
/// Generic over the transport type, allowing real hardware
/// (`SerialSession`) or mock links for testing.
pub struct MotorDrive<L: SerialLink = SerialSession<PololuJrk21v3>> {
    link: L,
    state: LinkState,
    limits: MotorLimits,
    calibration: CalibrationCurve,
    convergence: ConvergenceConfig,
    read_timeout: Duration,
}

impl MotorDrive<SerialSession<PololuJrk21v3>> {
    /// Open the controller's serial port and run the init handshake
    ///
    /// Opening and the handshake succeed or fail as a unit; there is no
    /// controller in a half-connected state.
    ///
    /// # Errors
    ///
    /// Returns `GemError::Connect` if the port cannot be opened or the
    /// handshake write fails.
    pub async fn connect(port_path: &str) -> Result<Self> {
        let link = SerialSession::open(port_path)?;
        let mut drive = Self::with_link(link);
        drive
            .handshake()
            .await
            .map_err(|e| GemError::Connect(format!("init handshake failed: {}", e)))?;
        Ok(drive)
    }
}

impl<L: SerialLink> MotorDrive<L> {
    /// Create a controller over an already-open link
    ///
    /// The handshake is not sent; call [`MotorDrive::handshake`] when the
    /// link is fresh. This is primarily useful for testing with mock links.
    pub fn with_link(link: L) -> Self {
        Self {
            link,
            state: LinkState::Connected,
            limits: MotorLimits::default(),
            calibration: CalibrationCurve::default(),
            convergence: ConvergenceConfig::default(),
            read_timeout: Duration::from_millis(PololuJrk21v3::READ_TIMEOUT_MS),
        }
    }

    /// Replace the convergence-loop settings
    pub fn set_convergence(&mut self, config: ConvergenceConfig) {
        self.convergence = config;
    }

    /// Device name of this controller
    pub fn device_name(&self) -> &'static str {
        PololuJrk21v3::NAME
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Whether the link accepts commands
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Path of the underlying port, if any
    pub fn port_path(&self) -> Option<&str> {
        self.link.port_path()
    }

    /// The actuator's travel limits
    pub fn limits(&self) -> MotorLimits {
        self.limits
    }

    /// The step-to-millimetre calibration in use
    pub fn calibration(&self) -> &CalibrationCurve {
        &self.calibration
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.state.is_ready() {
            return Err(GemError::NotReady);
        }
        Ok(())
    }

    /// Send the init handshake byte
    pub async fn handshake(&mut self) -> Result<()> {
        self.send_frame(&[MotorOpcode::Init as u8]).await
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.ensure_ready()?;
        if let Err(e) = self.link.write_bytes(frame).await {
            warn!("Motor write failed, marking link faulted: {}", e);
            self.state = LinkState::Faulted;
            return Err(e);
        }
        Ok(())
    }

    /// Read one little-endian 16-bit reply word
    ///
    /// A read that completes but yields fewer than two bytes is a lost
    /// connection, distinct from a transport failure: the port is healthy
    /// but the device said nothing.
    async fn read_word(&mut self) -> Result<u16> {
        let bytes = match self.link.read_up_to(2, self.read_timeout).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Motor read failed, marking link faulted: {}", e);
                self.state = LinkState::Faulted;
                return Err(e);
            }
        };
        if bytes.len() < 2 {
            return Err(GemError::ConnectionLost(format!(
                "expected 2 reply bytes, got {}",
                bytes.len()
            )));
        }
        Ok(u16::from(bytes[0]) | (u16::from(bytes[1]) << 8))
    }

    /// Read the feedback position
    ///
    /// # Errors
    ///
    /// `GemError::ConnectionLost` if the device sent no (or a truncated)
    /// reply; transport errors fault the link.
    pub async fn position(&mut self) -> Result<MotorPosition> {
        self.send_frame(&[MotorOpcode::GetPosition as u8]).await?;
        let steps = self.read_word().await?;
        Ok(MotorPosition {
            steps,
            position: self.calibration.label(steps),
        })
    }

    /// Read and decode the controller's error register
    ///
    /// Device-reported faults and garbled replies come back as data, not
    /// `Err`: a fault is information about the motor, not a failure of the
    /// query. A failed or empty read maps to the communication-error
    /// sentinel; the link still faults on transport errors, so later calls
    /// short-circuit with `NotReady`.
    pub async fn status(&mut self) -> Result<MotorStatus> {
        self.send_frame(&[MotorOpcode::ReadError as u8]).await?;
        match self.read_word().await {
            Ok(code) => Ok(MotorStatus::from_code(code)),
            Err(GemError::ConnectionLost(_)) => Ok(MotorStatus::Fault(MotorFault::COMM_LOST)),
            Err(e) => {
                debug!("Status read failed: {}", e);
                Ok(MotorStatus::Fault(MotorFault::COMM_LOST))
            }
        }
    }

    /// Stop the motor immediately; no reply expected
    pub async fn motor_stop(&mut self) -> Result<()> {
        self.send_frame(&[MotorOpcode::Stop as u8]).await
    }

    /// Move to a step position and wait for convergence
    ///
    /// The target is packed across two fields: its low 5 bits are added to
    /// the move opcode, the remaining 7 bits travel in the argument byte.
    /// After the command is sent the feedback position is polled until it
    /// is within tolerance of the target, then a stop is issued.
    ///
    /// # Errors
    ///
    /// `GemError::OutOfRange` for targets outside 140-3610 (nothing is
    /// sent), `GemError::Timeout` if a configured bound elapses, or any
    /// position-read error, which aborts the loop without stopping the
    /// motor.
    pub async fn move_to(&mut self, target: u16) -> Result<()> {
        self.ensure_ready()?;
        self.limits.validate_target(target)?;

        let frame = [
            MotorOpcode::MoveTo as u8 + (target & 0x1F) as u8,
            ((target >> 5) & 0x7F) as u8,
        ];
        self.send_frame(&frame).await?;
        info!("Motor moving to step {}", target);

        self.wait_until_converged(target).await
    }

    /// Move to the home position (the minimum step limit)
    pub async fn go_home(&mut self) -> Result<()> {
        self.move_to(self.limits.min_steps).await
    }

    async fn wait_until_converged(&mut self, target: u16) -> Result<()> {
        let started = Instant::now();
        loop {
            sleep(self.convergence.poll_interval).await;

            if let Some(limit) = self.convergence.max_duration {
                if started.elapsed() > limit {
                    return Err(GemError::Timeout(format!(
                        "no convergence to step {} within {:?}",
                        target, limit
                    )));
                }
            }

            let current = self.position().await?;
            let distance = (i32::from(target) - i32::from(current.steps)).unsigned_abs();
            if distance <= u32::from(self.limits.tolerance) {
                debug!("Converged at step {} ({})", current.steps, current.position);
                return self.motor_stop().await;
            }
            debug!(
                "Polling position: {} steps, {} from target",
                current.steps, distance
            );
        }
    }
}
