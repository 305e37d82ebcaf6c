//! Traits that separate the lock and lab logic from the peripherals.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AccessService (domain)
//! ```
//!
//! Driven adapters (link, EEPROM, keypad, display, motor, alarm, timer,
//! event sinks) implement these traits.  The
//! [`AccessService`](super::service::AccessService) and the two ECU roles
//! consume them via generics, so the domain core never touches hardware
//! directly.
//!
//! ## Notes
//!
//! - `ConfigPort::save` rejects out-of-range values before writing.
//! - **StoragePort** holds the password in plaintext; there is no
//!   encrypted partition on this target.
//! - Each port has its own error enum; all of them convert into
//!   [`Error`](crate::error::Error).

use crate::config::SystemConfig;
use crate::error::{ActuatorError, Result, SensorError};
use crate::lock::password::Verdict;
use crate::lock::protocol::{BootStatus, Decision};
use crate::lock::timed::DoorPhase;

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: UART between the two ECUs)
// ───────────────────────────────────────────────────────────────

/// Byte-at-a-time transport between the interface and controller ECUs.
///
/// `recv_byte` blocks until a byte arrives, or until the adapter's
/// configured timeout elapses.
pub trait LinkPort {
    fn send_byte(&mut self, byte: u8) -> core::result::Result<(), LinkError>;

    fn recv_byte(&mut self) -> core::result::Result<u8, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ EEPROM)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent storage.  Erased cells read `0xFF`.
pub trait StoragePort {
    fn read_byte(&self, addr: u16) -> core::result::Result<u8, StorageError>;

    fn write_byte(&mut self, addr: u16, value: u8) -> core::result::Result<(), StorageError>;

    /// Number of addressable bytes.
    fn capacity(&self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// User I/O ports (keypad in, character display out)
// ───────────────────────────────────────────────────────────────

/// A decoded keypad key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Plus,
    Minus,
    /// `*`: clear on the door lock, multiply on the calculator.
    Star,
    Slash,
    Equals,
    /// The ON/C key of the calculator keypad.
    Clear,
}

impl Key {
    /// Decode the ASCII code a 4x4 keypad scan returns.
    pub fn from_ascii(code: u8) -> Option<Self> {
        match code {
            b'0'..=b'9' => Some(Self::Digit(code - b'0')),
            b'+' => Some(Self::Plus),
            b'-' => Some(Self::Minus),
            b'*' => Some(Self::Star),
            b'/' => Some(Self::Slash),
            b'=' => Some(Self::Equals),
            b'C' | b'c' | 13 => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Blocking keypad scan.
pub trait KeypadPort {
    fn read_key(&mut self) -> core::result::Result<Key, InputError>;
}

/// Character display with row/column addressing.
pub trait DisplayPort {
    fn clear(&mut self);

    fn show_at(&mut self, row: u8, col: u8, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Sensor port (ADC)
// ───────────────────────────────────────────────────────────────

/// Blocking single-conversion ADC read.
pub trait AnalogPort {
    fn read_channel(&mut self, channel: u8) -> core::result::Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// H-bridge door motor.
pub trait DoorPort {
    fn rotate_forward(&mut self) -> core::result::Result<(), ActuatorError>;

    fn rotate_reverse(&mut self) -> core::result::Result<(), ActuatorError>;

    fn stop(&mut self) -> core::result::Result<(), ActuatorError>;
}

/// Buzzer plus warning LED.
pub trait AlarmPort {
    fn alarm_on(&mut self) -> core::result::Result<(), ActuatorError>;

    fn alarm_off(&mut self) -> core::result::Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Timer port (periodic tick source)
// ───────────────────────────────────────────────────────────────

/// What a [`TickHandler`] wants after handling a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    /// Stop delivering ticks (the handler is dropped).
    Disarm,
}

/// Work bound to a periodic timer interrupt.
pub trait TickHandler: Send {
    fn on_tick(&mut self) -> TickControl;
}

/// A timer that delivers ticks to one handler until it disarms.
pub trait TimerPort {
    fn arm(&mut self, handler: Box<dyn TickHandler>) -> core::result::Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Role port (one ECU's side of each sequencer step)
// ───────────────────────────────────────────────────────────────

/// Both ECUs run the same access-control sequence; this port performs the
/// role-specific half of every step.
pub trait RolePort {
    /// Short tag for log lines.
    fn name(&self) -> &'static str;

    /// Exchange the boot status and, on first login, set the password.
    fn bootstrap(&mut self) -> Result<BootStatus>;

    /// Agree on the next decision.
    fn decision(&mut self) -> Result<Decision>;

    /// Transfer one candidate password and agree on the verdict.
    fn check_password(&mut self) -> Result<Verdict>;

    /// Transfer and persist a confirmed new password.
    fn change_password(&mut self) -> Result<()>;

    /// Run one timed phase of the door sequence.
    fn door_phase(&mut self, phase: DoorPhase, ticks: u8) -> Result<()>;

    /// React to a mismatch; `attempts` already includes it.
    fn rejected(&mut self, attempts: u8, max_attempts: u8) -> Result<()>;

    /// Run the lockout alarm for `ticks`.
    fn alarm(&mut self, ticks: u8) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Config port (settings block in EEPROM)
// ───────────────────────────────────────────────────────────────

/// Settings block kept next to the password.  Out-of-range values are
/// refused with [`ConfigError::ValidationFailed`] rather than clamped.
pub trait ConfigPort {
    /// Stored settings, or [`SystemConfig::default()`] on an erased block.
    fn load(&self) -> core::result::Result<SystemConfig, ConfigError>;

    /// Range-check, then write.
    fn save(&mut self, config: &SystemConfig) -> core::result::Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`LinkPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No byte arrived within the configured timeout.
    Timeout,
    /// The peer end is gone.
    Closed,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address beyond the end of the device.
    OutOfRange(u16),
    /// The cell could not be read or written.
    IoError,
}

/// Errors from [`KeypadPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The key source has nothing more to deliver.
    Exhausted,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Bytes present but not a valid settings block.
    Corrupted,
    /// Named field out of range.
    ValidationFailed(&'static str),
    /// Encoded config does not fit the reserved block.
    StorageFull,
    /// EEPROM access failed.
    IoError,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "receive timed out"),
            Self::Closed => write!(f, "peer closed"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange(addr) => write!(f, "address 0x{:03X} out of range", addr),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for InputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no more keys"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
