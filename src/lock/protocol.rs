//! READY/data byte handshake shared by both ECUs.
//!
//! ```text
//!   receiver                 sender
//!      │ ──── READY (0x10) ───▶ │   (sender drops anything else)
//!      │ ◀────── data ───────── │
//! ```
//!
//! Every byte, including each password digit, is preceded by its own
//! READY from the receiving side.  No payload byte ever equals READY, so a
//! receiver that finds a READY where data belongs skips it: it is left
//! over from a receive the peer abandoned on timeout.

use log::trace;

use crate::app::ports::{LinkError, LinkPort};
use crate::error::ProtocolError;

use super::password::{PASSWORD_WIDTH, Password, Verdict};

/// Receiver-ready sentinel.
pub const READY: u8 = 0x10;

pub const VERDICT_MATCHED: u8 = 0;
pub const VERDICT_MISMATCHED: u8 = 1;

pub const DECISION_CHANGE_PASSWORD: u8 = b'+';
pub const DECISION_OPEN_DOOR: u8 = b'-';

pub const STATUS_ANY_TIME_LOGIN: u8 = 0;
pub const STATUS_FIRST_TIME_LOGIN: u8 = 1;

/// What the user asked for at the start of an access cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    ChangePassword,
    OpenDoor,
}

/// Exchanged once at power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStatus {
    AnyTimeLogin,
    FirstTimeLogin,
}

impl Decision {
    pub fn to_byte(self) -> u8 {
        match self {
            Self::ChangePassword => DECISION_CHANGE_PASSWORD,
            Self::OpenDoor => DECISION_OPEN_DOOR,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        match b {
            DECISION_CHANGE_PASSWORD => Ok(Self::ChangePassword),
            DECISION_OPEN_DOOR => Ok(Self::OpenDoor),
            other => Err(ProtocolError::UnknownDecision(other)),
        }
    }
}

impl BootStatus {
    pub fn to_byte(self) -> u8 {
        match self {
            Self::AnyTimeLogin => STATUS_ANY_TIME_LOGIN,
            Self::FirstTimeLogin => STATUS_FIRST_TIME_LOGIN,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        match b {
            STATUS_ANY_TIME_LOGIN => Ok(Self::AnyTimeLogin),
            STATUS_FIRST_TIME_LOGIN => Ok(Self::FirstTimeLogin),
            other => Err(ProtocolError::UnknownStatus(other)),
        }
    }
}

impl Verdict {
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Matched => VERDICT_MATCHED,
            Self::Mismatched => VERDICT_MISMATCHED,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, ProtocolError> {
        match b {
            VERDICT_MATCHED => Ok(Self::Matched),
            VERDICT_MISMATCHED => Ok(Self::Mismatched),
            other => Err(ProtocolError::UnknownVerdict(other)),
        }
    }
}

// ── Single byte ───────────────────────────────────────────────

/// Announce readiness, then take the next byte.
pub fn receive(link: &mut impl LinkPort) -> Result<u8, LinkError> {
    link.send_byte(READY)?;
    loop {
        let b = link.recv_byte()?;
        if b != READY {
            return Ok(b);
        }
        trace!("handshake: skipped stale READY");
    }
}

/// Wait for the peer's READY, then send `byte`.
pub fn send(link: &mut impl LinkPort, byte: u8) -> Result<(), LinkError> {
    loop {
        let b = link.recv_byte()?;
        if b == READY {
            break;
        }
        trace!("handshake: dropped 0x{:02X} while waiting for READY", b);
    }
    link.send_byte(byte)
}

// ── Password payload ──────────────────────────────────────────

/// Send all five digits, one handshake per digit.
pub fn send_password(link: &mut impl LinkPort, password: &Password) -> Result<(), LinkError> {
    for digit in password.digits() {
        send(link, *digit)?;
    }
    Ok(())
}

/// Receive five raw bytes, one handshake per byte.
pub fn receive_digits(link: &mut impl LinkPort) -> Result<[u8; PASSWORD_WIDTH], LinkError> {
    let mut raw = [0u8; PASSWORD_WIDTH];
    for slot in raw.iter_mut() {
        *slot = receive(link)?;
    }
    Ok(raw)
}
