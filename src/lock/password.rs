//! Password value type, comparator, EEPROM layout, and attempt counter.

use log::debug;

use crate::app::ports::{StorageError, StoragePort};
use crate::error::ProtocolError;

/// Number of digits in a password.
pub const PASSWORD_WIDTH: usize = 5;

/// EEPROM address of the first password digit.
pub const PASSWORD_BASE_ADDR: u16 = 0;

/// Value of an erased EEPROM cell; at the base address it means
/// "no password was ever set".
pub const ERASED: u8 = 0xFF;

/// Result of comparing a candidate against the stored password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    Mismatched,
}

/// A five-digit password.  Every byte is 0–9.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Password([u8; PASSWORD_WIDTH]);

impl Password {
    /// Build from raw digits, rejecting anything outside 0–9.
    pub fn new(digits: [u8; PASSWORD_WIDTH]) -> Result<Self, ProtocolError> {
        match digits.iter().find(|d| **d > 9) {
            Some(bad) => Err(ProtocolError::NotADigit(*bad)),
            None => Ok(Self(digits)),
        }
    }

    pub fn digits(&self) -> &[u8; PASSWORD_WIDTH] {
        &self.0
    }

    /// Read the stored password.
    pub fn load(store: &impl StoragePort) -> Result<[u8; PASSWORD_WIDTH], StorageError> {
        let mut raw = [0u8; PASSWORD_WIDTH];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = store.read_byte(PASSWORD_BASE_ADDR + i as u16)?;
        }
        Ok(raw)
    }

    /// Overwrite the stored password, one digit per cell.
    pub fn save(&self, store: &mut impl StoragePort) -> Result<(), StorageError> {
        for (i, digit) in self.0.iter().enumerate() {
            store.write_byte(PASSWORD_BASE_ADDR + i as u16, *digit)?;
        }
        debug!("password written to EEPROM @0x{:03X}", PASSWORD_BASE_ADDR);
        Ok(())
    }

    /// Compare against raw stored bytes.
    pub fn check(&self, stored: &[u8; PASSWORD_WIDTH]) -> Verdict {
        compare(&self.0, stored)
    }
}

// Digits stay off the logs.
impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Password(*****)")
    }
}

/// `true` when the base cell still holds the erased sentinel.
pub fn is_first_login(store: &impl StoragePort) -> Result<bool, StorageError> {
    Ok(store.read_byte(PASSWORD_BASE_ADDR)? == ERASED)
}

/// Exact comparison, stopping at the first differing position.
pub fn compare(a: &[u8; PASSWORD_WIDTH], b: &[u8; PASSWORD_WIDTH]) -> Verdict {
    for (x, y) in a.iter().zip(b.iter()) {
        if x != y {
            return Verdict::Mismatched;
        }
    }
    Verdict::Matched
}

// ───────────────────────────────────────────────────────────────
// Attempt counter
// ───────────────────────────────────────────────────────────────

/// Consecutive mismatches within one access cycle, bounded by `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCounter {
    count: u8,
    limit: u8,
}

impl AttemptCounter {
    pub fn new(limit: u8) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
        }
    }

    /// Record a mismatch.  Saturates at the limit.
    pub fn record_failure(&mut self) -> u8 {
        if self.count < self.limit {
            self.count += 1;
        }
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }

    pub fn exhausted(&self) -> bool {
        self.count >= self.limit
    }
}
