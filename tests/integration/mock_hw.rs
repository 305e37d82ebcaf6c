//! Mock hardware adapters for integration tests.
//!
//! Record every actuator call, EEPROM write, screen and link byte so
//! tests can assert on the full history without real registers.

use std::collections::VecDeque;

use avrlabs::adapters::console::TextDisplay;
use avrlabs::app::events::AppEvent;
use avrlabs::app::ports::{
    AlarmPort, DisplayPort, DoorPort, EventSink, LinkError, LinkPort, StorageError, StoragePort,
};
use avrlabs::error::ActuatorError;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Forward,
    Reverse,
    Stop,
    AlarmOn,
    AlarmOff,
}

// ── MockDoorHardware ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockDoorHardware {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockDoorHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, call: ActuatorCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl DoorPort for MockDoorHardware {
    fn rotate_forward(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Forward);
        Ok(())
    }

    fn rotate_reverse(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Reverse);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Stop);
        Ok(())
    }
}

impl AlarmPort for MockDoorHardware {
    fn alarm_on(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::AlarmOn);
        Ok(())
    }

    fn alarm_off(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::AlarmOff);
        Ok(())
    }
}

// ── MockEeprom ────────────────────────────────────────────────

pub struct MockEeprom {
    cells: [u8; 64],
    pub writes: Vec<(u16, u8)>,
}

#[allow(dead_code)]
impl MockEeprom {
    /// Never-written part.
    pub fn erased() -> Self {
        Self {
            cells: [0xFF; 64],
            writes: Vec::new(),
        }
    }

    /// Part with a password already stored.
    pub fn with_password(digits: [u8; 5]) -> Self {
        let mut e = Self::erased();
        e.cells[..5].copy_from_slice(&digits);
        e
    }

    pub fn password(&self) -> [u8; 5] {
        let mut out = [0u8; 5];
        out.copy_from_slice(&self.cells[..5]);
        out
    }
}

impl StoragePort for MockEeprom {
    fn read_byte(&self, addr: u16) -> Result<u8, StorageError> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        let cell = self
            .cells
            .get_mut(addr as usize)
            .ok_or(StorageError::OutOfRange(addr))?;
        *cell = value;
        self.writes.push((addr, value));
        Ok(())
    }

    fn capacity(&self) -> u16 {
        self.cells.len() as u16
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Debug, Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ScreenLog ─────────────────────────────────────────────────

/// LCD that also keeps every string ever written to it.
pub struct ScreenLog {
    pub lcd: TextDisplay,
    pub shown: Vec<String>,
}

#[allow(dead_code)]
impl ScreenLog {
    pub fn new() -> Self {
        Self {
            lcd: TextDisplay::new("hmi"),
            shown: Vec::new(),
        }
    }
}

/// True when `expected` appears in `shown` in this order, other writes
/// allowed in between.
#[allow(dead_code)]
pub fn showed_in_order(shown: &[String], expected: &[&str]) -> bool {
    let mut history = shown.iter();
    expected.iter().all(|e| history.any(|s| s == e))
}

impl DisplayPort for ScreenLog {
    fn clear(&mut self) {
        self.lcd.clear();
    }

    fn show_at(&mut self, row: u8, col: u8, text: &str) {
        self.shown.push(text.to_string());
        self.lcd.show_at(row, col, text);
    }
}

// ── ScriptedLink ──────────────────────────────────────────────

/// Peer stand-in: replays fixed inbound bytes, records outbound ones,
/// and reads as hung up once the script is spent.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    inbound: VecDeque<u8>,
    pub sent: Vec<u8>,
}

#[allow(dead_code)]
impl ScriptedLink {
    pub fn new(inbound: &[u8]) -> Self {
        Self {
            inbound: inbound.iter().copied().collect(),
            sent: Vec::new(),
        }
    }
}

impl LinkPort for ScriptedLink {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        self.sent.push(byte);
        Ok(())
    }

    fn recv_byte(&mut self) -> Result<u8, LinkError> {
        self.inbound.pop_front().ok_or(LinkError::Closed)
    }
}
