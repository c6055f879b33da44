//! HV supply - high-level interface over the ASCII command protocol
//!
//! Implements the Digital Interface II command set of the Heinzinger
//! PNC 6000-10. Commands are plain ASCII tokens, newline terminated; query
//! replies arrive as text with a single trailing terminator character.

use std::time::Duration;

use gemctl_core::{DeviceProfile, GemError, HeinzingerPnc6000, HvLimits, LinkState, Result};
use tracing::{debug, warn};

use crate::serial_link::{SerialLink, SerialSession};

/// Commands understood by the digital interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvCommand {
    /// Set the voltage setpoint (`VOLT <n>`)
    SetVoltage,
    /// Query the voltage setpoint (`VOLT?`)
    GetVoltage,
    /// Set the current setpoint (`CURR <n>`)
    SetCurrent,
    /// Query the current setpoint (`CURR?`)
    GetCurrent,
    /// Activate the output (`OUTP ON`)
    TurnOn,
    /// Deactivate the output (`OUTP OFF`)
    TurnOff,
    /// Measure the real output voltage (`MEAS:VOLT?`)
    MeasureVoltage,
    /// Measure the real output current (`MEAS:CURR?`)
    MeasureCurrent,
    /// Query the interface firmware version (`VERS?`)
    GetVersion,
    /// Query the supply serial number (`*IDN?`)
    GetSerialNumber,
    /// Reset the interface (`*RST`)
    Reset,
}

impl HvCommand {
    /// Wire token for this command
    pub fn token(self) -> &'static str {
        match self {
            HvCommand::SetVoltage => "VOLT",
            HvCommand::GetVoltage => "VOLT?",
            HvCommand::SetCurrent => "CURR",
            HvCommand::GetCurrent => "CURR?",
            HvCommand::TurnOn => "OUTP ON",
            HvCommand::TurnOff => "OUTP OFF",
            HvCommand::MeasureVoltage => "MEAS:VOLT?",
            HvCommand::MeasureCurrent => "MEAS:CURR?",
            HvCommand::GetVersion => "VERS?",
            HvCommand::GetSerialNumber => "*IDN?",
            HvCommand::Reset => "*RST",
        }
    }
}

/// Settle delay before reading back a setpoint or identity query
const SETPOINT_SETTLE: Duration = Duration::from_millis(100);

/// Settle delay before reading back a measurement query
///
/// The instrument's ADC conversion is slower than its setpoint readback.
const MEASURE_SETTLE: Duration = Duration::from_millis(300);

/// Upper bound on a single reply
const REPLY_MAX: usize = 64;

/// Default host-side ramp rate in V/s
const DEFAULT_RAMP: u32 = 50;

/// HV supply controller
///
/// Generic over the transport type, allowing real hardware
/// (`SerialSession`) or mock links for testing.
pub struct HvSupply<L: SerialLink = SerialSession<HeinzingerPnc6000>> {
    link: L,
    state: LinkState,
    limits: HvLimits,
    ramp_up: u32,
    ramp_down: u32,
    read_timeout: Duration,
}

impl HvSupply<SerialSession<HeinzingerPnc6000>> {
    /// Open the supply's serial port
    ///
    /// # Errors
    ///
    /// Returns `GemError::Connect` if the port cannot be opened; no
    /// controller exists in that case.
    pub fn connect(port_path: &str) -> Result<Self> {
        let link = SerialSession::open(port_path)?;
        Ok(Self::with_link(link))
    }
}

impl<L: SerialLink> HvSupply<L> {
    /// Create a controller over an already-open link
    ///
    /// This is primarily useful for testing with mock links.
    pub fn with_link(link: L) -> Self {
        Self {
            link,
            state: LinkState::Connected,
            limits: HvLimits::default(),
            ramp_up: DEFAULT_RAMP,
            ramp_down: DEFAULT_RAMP,
            read_timeout: Duration::from_millis(HeinzingerPnc6000::READ_TIMEOUT_MS),
        }
    }

    /// Device name of this controller
    pub fn device_name(&self) -> &'static str {
        HeinzingerPnc6000::NAME
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

    /// The supply's output limits
    pub fn limits(&self) -> HvLimits {
        self.limits
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.state.is_ready() {
            return Err(GemError::NotReady);
        }
        Ok(())
    }

    /// Encode and send one command frame: `TOKEN[ ARG]\n`
    async fn send_command(&mut self, cmd: HvCommand, argument: Option<&str>) -> Result<()> {
        self.ensure_ready()?;
        self.link.clear_input_buffer()?;

        let mut frame = String::from(cmd.token());
        if let Some(arg) = argument {
            frame.push(' ');
            frame.push_str(arg);
        }
        frame.push('\n');

        debug!("Sending HV command: {:?}", frame);

        if let Err(e) = self.link.write_bytes(frame.as_bytes()).await {
            warn!("HV write failed, marking link faulted: {}", e);
            self.state = LinkState::Faulted;
            return Err(e);
        }
        Ok(())
    }

    /// Read whatever reply is on the line and strip the trailing terminator
    ///
    /// The interface terminates every reply with a single trailing
    /// character. An empty or truncated buffer therefore yields an empty or
    /// truncated string; that leniency is intentional, callers see exactly
    /// what the device managed to say.
    async fn read_reply(&mut self) -> Result<String> {
        match self.link.read_up_to(REPLY_MAX, self.read_timeout).await {
            Ok(bytes) => {
                let mut text = String::from_utf8_lossy(&bytes).into_owned();
                text.pop();
                debug!("HV reply: {:?}", text);
                Ok(text)
            }
            Err(e) => {
                warn!("HV read failed, marking link faulted: {}", e);
                self.state = LinkState::Faulted;
                Err(e)
            }
        }
    }

    /// Send a query, let the instrument settle, read the reply
    async fn query(&mut self, cmd: HvCommand, settle: Duration) -> Result<String> {
        self.send_command(cmd, None).await?;
        tokio::time::sleep(settle).await;
        self.read_reply().await
    }

    /// Set the voltage setpoint in volts
    ///
    /// # Errors
    ///
    /// Returns `GemError::OutOfRange` for values outside 0-6000 V; nothing
    /// is sent in that case.
    pub async fn set_voltage(&mut self, volts: i32) -> Result<()> {
        self.ensure_ready()?;
        self.limits.validate_voltage(volts)?;
        self.send_command(HvCommand::SetVoltage, Some(&volts.to_string()))
            .await
    }

    /// Set the current setpoint in microamps
    ///
    /// # Errors
    ///
    /// Returns `GemError::OutOfRange` for values outside 0-10000 uA; nothing
    /// is sent in that case.
    pub async fn set_current(&mut self, microamps: i32) -> Result<()> {
        self.ensure_ready()?;
        self.limits.validate_current(microamps)?;
        self.send_command(HvCommand::SetCurrent, Some(&microamps.to_string()))
            .await
    }

    /// Read back the voltage setpoint
    pub async fn voltage_setpoint(&mut self) -> Result<String> {
        self.query(HvCommand::GetVoltage, SETPOINT_SETTLE).await
    }

    /// Read back the current setpoint
    pub async fn current_setpoint(&mut self) -> Result<String> {
        self.query(HvCommand::GetCurrent, SETPOINT_SETTLE).await
    }

    /// Measure the real output voltage
    pub async fn measure_voltage(&mut self) -> Result<String> {
        self.query(HvCommand::MeasureVoltage, MEASURE_SETTLE).await
    }

    /// Measure the real output current
    pub async fn measure_current(&mut self) -> Result<String> {
        self.query(HvCommand::MeasureCurrent, MEASURE_SETTLE).await
    }

    /// Query the interface firmware version
    pub async fn version(&mut self) -> Result<String> {
        self.query(HvCommand::GetVersion, SETPOINT_SETTLE).await
    }

    /// Query the supply serial number
    pub async fn serial_number(&mut self) -> Result<String> {
        self.query(HvCommand::GetSerialNumber, SETPOINT_SETTLE)
            .await
    }

    /// Activate the output; no reply expected
    pub async fn turn_on(&mut self) -> Result<()> {
        self.send_command(HvCommand::TurnOn, None).await
    }

    /// Deactivate the output; no reply expected
    pub async fn turn_off(&mut self) -> Result<()> {
        self.send_command(HvCommand::TurnOff, None).await
    }

    /// Reset the interface; clears every setpoint on the device
    pub async fn reset(&mut self) -> Result<()> {
        self.send_command(HvCommand::Reset, None).await
    }

    /// Host-side ramp-up rate in V/s
    ///
    /// Ramp rates are bookkeeping only; the interface exposes no ramp
    /// command, so they are never sent to the device.
    pub fn ramp_up(&self) -> u32 {
        self.ramp_up
    }

    /// Host-side ramp-down rate in V/s
    pub fn ramp_down(&self) -> u32 {
        self.ramp_down
    }

    /// Set the host-side ramp-up rate in V/s
    pub fn set_ramp_up(&mut self, volts_per_second: u32) {
        self.ramp_up = volts_per_second;
    }

    /// Set the host-side ramp-down rate in V/s
    pub fn set_ramp_down(&mut self, volts_per_second: u32) {
        self.ramp_down = volts_per_second;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLink;

    fn supply_with_probe() -> (HvSupply<MockLink>, MockLink) {
        let link = MockLink::new();
        let probe = link.clone();
        (HvSupply::with_link(link), probe)
    }

    #[tokio::test]
    async fn test_set_voltage_encodes_frame() {
        let (mut hv, probe) = supply_with_probe();

        hv.set_voltage(3000).await.unwrap();

        assert_eq!(probe.written(), vec![b"VOLT 3000\n".to_vec()]);
    }

    #[tokio::test]
    async fn test_set_voltage_bounds() {
        let (mut hv, probe) = supply_with_probe();

        hv.set_voltage(0).await.unwrap();
        hv.set_voltage(6000).await.unwrap();
        assert_eq!(probe.written().len(), 2);

        // Out of range: explicit error, no write
        let err = hv.set_voltage(6001).await.unwrap_err();
        assert!(matches!(err, GemError::OutOfRange { .. }));
        let err = hv.set_voltage(-1).await.unwrap_err();
        assert!(matches!(err, GemError::OutOfRange { .. }));
        assert_eq!(probe.written().len(), 2);
    }

    #[tokio::test]
    async fn test_set_current_bounds() {
        let (mut hv, probe) = supply_with_probe();

        hv.set_current(10_000).await.unwrap();
        assert_eq!(probe.written(), vec![b"CURR 10000\n".to_vec()]);

        let err = hv.set_current(10_001).await.unwrap_err();
        assert!(matches!(err, GemError::OutOfRange { .. }));
        assert_eq!(probe.written().len(), 1);
    }

    #[tokio::test]
    async fn test_turn_on_off_encoding() {
        let (mut hv, probe) = supply_with_probe();

        hv.turn_on().await.unwrap();
        hv.turn_off().await.unwrap();
        hv.reset().await.unwrap();

        assert_eq!(
            probe.written(),
            vec![
                b"OUTP ON\n".to_vec(),
                b"OUTP OFF\n".to_vec(),
                b"*RST\n".to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_strips_single_terminator() {
        let (mut hv, probe) = supply_with_probe();
        probe.queue_reply(b"3000\n");

        let reply = hv.voltage_setpoint().await.unwrap();

        assert_eq!(reply, "3000");
        assert_eq!(probe.written(), vec![b"VOLT?\n".to_vec()]);
    }

    #[tokio::test]
    async fn test_empty_reply_yields_empty_string() {
        let (mut hv, probe) = supply_with_probe();
        probe.queue_silence();

        let reply = hv.measure_voltage().await.unwrap();
        assert_eq!(reply, "");
        assert!(hv.is_ready());
    }

    #[tokio::test]
    async fn test_write_failure_faults_link() {
        let (mut hv, probe) = supply_with_probe();
        probe.fail_writes();

        let err = hv.turn_on().await.unwrap_err();
        assert!(matches!(err, GemError::Serial(_)));
        assert_eq!(hv.state(), LinkState::Faulted);

        // Subsequent operations short-circuit without touching the transport
        let err = hv.set_voltage(100).await.unwrap_err();
        assert!(matches!(err, GemError::NotReady));
        assert!(probe.written().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_faults_link() {
        let (mut hv, probe) = supply_with_probe();
        probe.queue_read_error();

        let err = hv.current_setpoint().await.unwrap_err();
        assert!(matches!(err, GemError::Serial(_)));
        assert_eq!(hv.state(), LinkState::Faulted);

        let err = hv.measure_current().await.unwrap_err();
        assert!(matches!(err, GemError::NotReady));
    }

    #[tokio::test]
    async fn test_ramp_rates_are_host_side_only() {
        let (mut hv, probe) = supply_with_probe();

        assert_eq!(hv.ramp_up(), 50);
        assert_eq!(hv.ramp_down(), 50);

        hv.set_ramp_up(100);
        hv.set_ramp_down(25);

        assert_eq!(hv.ramp_up(), 100);
        assert_eq!(hv.ramp_down(), 25);
        // Nothing ever goes on the wire for ramp settings
        assert!(probe.written().is_empty());
    }

    #[test]
    fn test_command_tokens() {
        assert_eq!(HvCommand::SetVoltage.token(), "VOLT");
        assert_eq!(HvCommand::GetVoltage.token(), "VOLT?");
        assert_eq!(HvCommand::SetCurrent.token(), "CURR");
        assert_eq!(HvCommand::GetCurrent.token(), "CURR?");
        assert_eq!(HvCommand::TurnOn.token(), "OUTP ON");
        assert_eq!(HvCommand::TurnOff.token(), "OUTP OFF");
        assert_eq!(HvCommand::MeasureVoltage.token(), "MEAS:VOLT?");
        assert_eq!(HvCommand::MeasureCurrent.token(), "MEAS:CURR?");
        assert_eq!(HvCommand::GetVersion.token(), "VERS?");
        assert_eq!(HvCommand::GetSerialNumber.token(), "*IDN?");
        assert_eq!(HvCommand::Reset.token(), "*RST");
    }
}
