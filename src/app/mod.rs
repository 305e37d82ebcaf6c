//! Door-lock session logic shared by the control and interface ECUs.
//!
//! [`service::AccessService`] drives the password state machine and
//! reports [`events::AppEvent`]s.  It never touches a register: each ECU
//! plugs in through the traits in [`ports`].

pub mod events;
pub mod ports;
pub mod service;
