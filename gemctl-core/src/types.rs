//! Core types and data structures for GEM slow control

use serde::Serialize;

use crate::error::{GemError, Result};

/// Connection state of a device link
///
/// Transitions: a successful connect yields `Connected`; any transport
/// failure moves the link to `Faulted`, and the only way back is a fresh
/// connect. Operations on a link that is not `Connected` short-circuit with
/// `GemError::NotReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    /// No open session
    Disconnected,
    /// Session open, commands accepted
    Connected,
    /// Session broken by an I/O failure; reconnect required
    Faulted,
}

impl LinkState {
    /// Whether commands may be issued in this state
    pub fn is_ready(self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Faulted => write!(f, "faulted"),
        }
    }
}

/// Output limits of the HV supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HvLimits {
    /// Minimum voltage setpoint in volts
    pub min_volts: i32,
    /// Maximum voltage setpoint in volts
    pub max_volts: i32,
    /// Minimum current setpoint in microamps
    pub min_microamps: i32,
    /// Maximum current setpoint in microamps
    pub max_microamps: i32,
}

impl Default for HvLimits {
    fn default() -> Self {
        Self {
            min_volts: 0,
            max_volts: 6000,
            min_microamps: 0,
            max_microamps: 10_000,
        }
    }
}

impl HvLimits {
    /// Validate a voltage setpoint against this supply's range
    ///
    /// # Errors
    ///
    /// Returns `GemError::OutOfRange` if the value is outside the range.
    pub fn validate_voltage(&self, volts: i32) -> Result<()> {
        if volts < self.min_volts || volts > self.max_volts {
            return Err(GemError::OutOfRange {
                quantity: "Voltage",
                value: i64::from(volts),
                min: i64::from(self.min_volts),
                max: i64::from(self.max_volts),
            });
        }
        Ok(())
    }

    /// Validate a current setpoint against this supply's range
    ///
    /// # Errors
    ///
    /// Returns `GemError::OutOfRange` if the value is outside the range.
    pub fn validate_current(&self, microamps: i32) -> Result<()> {
        if microamps < self.min_microamps || microamps > self.max_microamps {
            return Err(GemError::OutOfRange {
                quantity: "Current",
                value: i64::from(microamps),
                min: i64::from(self.min_microamps),
                max: i64::from(self.max_microamps),
            });
        }
        Ok(())
    }
}

/// Travel limits and convergence tolerance of the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotorLimits {
    /// Lowest commandable step (home position)
    pub min_steps: u16,
    /// Highest commandable step
    pub max_steps: u16,
    /// Position-match tolerance in steps
    pub tolerance: u16,
}

impl Default for MotorLimits {
    fn default() -> Self {
        Self {
            min_steps: 140,
            max_steps: 3610,
            tolerance: 4,
        }
    }
}

impl MotorLimits {
    /// Validate a move target against the travel range
    ///
    /// # Errors
    ///
    /// Returns `GemError::OutOfRange` if the target is outside the range.
    pub fn validate_target(&self, steps: u16) -> Result<()> {
        if steps < self.min_steps || steps > self.max_steps {
            return Err(GemError::OutOfRange {
                quantity: "Step target",
                value: i64::from(steps),
                min: i64::from(self.min_steps),
                max: i64::from(self.max_steps),
            });
        }
        Ok(())
    }
}

/// A decoded motor controller fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotorFault {
    /// Raw status code from the controller (or a sentinel)
    pub code: u16,
    /// Human-readable label
    pub label: &'static str,
}

impl MotorFault {
    /// Sentinel for a status word that parsed but matches no known fault
    pub const COMM_GARBLED: MotorFault = MotorFault {
        code: 128,
        label: "Serial Communication Error",
    };

    /// Sentinel for a status read that failed outright
    pub const COMM_LOST: MotorFault = MotorFault {
        code: 255,
        label: "Serial Communication Error",
    };
}

impl std::fmt::Display for MotorFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.label, self.code)
    }
}

/// Decoded status word of the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "fault", rename_all = "lowercase")]
pub enum MotorStatus {
    /// No fault bits set; controller is ready
    Ready,
    /// A device-reported fault or a communication-error sentinel
    Fault(MotorFault),
}

impl MotorStatus {
    /// Decode a raw 16-bit status word
    ///
    /// Codes below 2 mean ready. The known fault codes come from the Jrk
    /// error register; anything else is treated as a garbled reply.
    pub fn from_code(code: u16) -> Self {
        if code < 2 {
            return MotorStatus::Ready;
        }
        let fault = match code {
            2 => MotorFault {
                code: 2,
                label: "No Power Connected",
            },
            4 => MotorFault {
                code: 4,
                label: "Motor Driver Error",
            },
            8 => MotorFault {
                code: 8,
                label: "Input Invalid",
            },
            16 => MotorFault {
                code: 16,
                label: "Input Disconnected",
            },
            32 => MotorFault {
                code: 32,
                label: "Feedback Disconnected",
            },
            64 => MotorFault {
                code: 64,
                label: "Max. Current Exceeded",
            },
            _ => MotorFault::COMM_GARBLED,
        };
        MotorStatus::Fault(fault)
    }

    /// Whether the controller reported ready
    pub fn is_ready(self) -> bool {
        matches!(self, MotorStatus::Ready)
    }
}

impl std::fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotorStatus::Ready => write!(f, "Ready"),
            MotorStatus::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

/// A position reading: raw steps plus the calibrated millimetre label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotorPosition {
    /// Raw step count from the controller
    pub steps: u16,
    /// Calibrated physical position, e.g. "1308.5 mm"
    pub position: String,
}

/// Two-point linear calibration from step count to actuator position
///
/// The anchors were measured on the assembled stand: step 140 sits at
/// 1308.5 mm and step 3610 at 1439.5 mm along the beam axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationCurve {
    /// Step count of the first anchor
    pub min_steps: f64,
    /// Physical position of the first anchor in millimetres
    pub min_mm: f64,
    /// Step count of the second anchor
    pub max_steps: f64,
    /// Physical position of the second anchor in millimetres
    pub max_mm: f64,
}

impl Default for CalibrationCurve {
    fn default() -> Self {
        Self {
            min_steps: 140.0,
            min_mm: 1308.5,
            max_steps: 3610.0,
            max_mm: 1439.5,
        }
    }
}

impl CalibrationCurve {
    /// Map a step count to a physical position in millimetres
    pub fn position_mm(&self, steps: u16) -> f64 {
        (self.max_mm - self.min_mm) / (self.max_steps - self.min_steps)
            * (f64::from(steps) - self.min_steps)
            + self.min_mm
    }

    /// Format a step count as a calibrated position label
    pub fn label(&self, steps: u16) -> String {
        format!("{:.1} mm", self.position_mm(steps))
    }

    /// Resolution of the actuator in steps per millimetre (~26.5)
    pub fn steps_per_mm(&self) -> f64 {
        (self.max_steps - self.min_steps) / (self.max_mm - self.min_mm)
    }
}
