//! Unified error types for the lab firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! sequencer and the simulation binary handle failures uniformly.
//! All variants are `Copy` so they pass through the FSM and the timer
//! handlers without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, InputError, LinkError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Error type shared by the lock ECUs and the labs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The inter-ECU byte link failed or timed out.
    Link(LinkError),
    /// EEPROM read or write failed.
    Storage(StorageError),
    /// The peer sent a byte that the handshake does not allow here.
    Protocol(ProtocolError),
    /// An output driver rejected a command.
    Actuator(ActuatorError),
    /// The keypad produced no more input.
    Input(InputError),
    /// An ADC conversion failed or returned an impossible value.
    Sensor(SensorError),
    /// A duty-cycle measurement could not be computed.
    Measurement(DutyCycleError),
    /// A calculator operation failed.
    Calc(CalcError),
    /// Settings could not be loaded or failed validation.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Measurement(e) => write!(f, "measurement: {e}"),
            Self::Calc(e) => write!(f, "calculator: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::StorageFull => Self::Config("storage full"),
            ConfigError::IoError => Self::Config("I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Bootstrap status byte was neither any-time nor first-time login.
    UnknownStatus(u8),
    /// Decision byte was neither `+` nor `-`.
    UnknownDecision(u8),
    /// Verdict byte was neither matched nor mismatched.
    UnknownVerdict(u8),
    /// A password byte outside 0–9 arrived.
    NotADigit(u8),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatus(b) => write!(f, "unknown boot status 0x{b:02X}"),
            Self::UnknownDecision(b) => write!(f, "unknown decision 0x{b:02X}"),
            Self::UnknownVerdict(b) => write!(f, "unknown verdict 0x{b:02X}"),
            Self::NotADigit(b) => write!(f, "password byte 0x{b:02X} is not a digit"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
    /// The tick timer could not be armed.
    TimerUnavailable,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::TimerUnavailable => write!(f, "tick timer unavailable"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    AdcReadFailed,
    /// Conversion result wider than the ADC resolution.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Measurement errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyCycleError {
    /// `period_plus_high == high`: the ratio's divisor is zero.
    ZeroDivisor,
    /// Samples are not monotonic (`high <= period <= period_plus_high`).
    DegenerateSamples,
    /// Capture was read before all four edges arrived.
    Incomplete,
}

impl fmt::Display for DutyCycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDivisor => write!(f, "edge samples collide (zero divisor)"),
            Self::DegenerateSamples => write!(f, "edge samples out of order"),
            Self::Incomplete => write!(f, "capture incomplete"),
        }
    }
}

impl From<DutyCycleError> for Error {
    fn from(e: DutyCycleError) -> Self {
        Self::Measurement(e)
    }
}

// ---------------------------------------------------------------------------
// Calculator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    DivisionByZero,
    /// Operand exceeded the accumulator range.
    Overflow,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "operand overflow"),
        }
    }
}

impl From<CalcError> for Error {
    fn from(e: CalcError) -> Self {
        Self::Calc(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// `Result` with the crate error.
pub type Result<T> = core::result::Result<T, Error>;
