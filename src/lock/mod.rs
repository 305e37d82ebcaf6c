//! Two-ECU door lock.
//!
//! ```text
//!  keypad ─▶ InterfaceEcu ══ byte link ══ ControlEcu ─▶ EEPROM
//!  display ◀┘                                      └──▶ motor, alarm
//! ```
//!
//! Both ECUs run the same [`AccessService`](crate::app::service::AccessService);
//! [`hmi`] and [`control`] supply the two role ports.

pub mod control;
pub mod hmi;
pub mod password;
pub mod protocol;
pub mod timed;
