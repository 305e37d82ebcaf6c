//! ATmega16 lab firmware library.
//!
//! Exposes the pure-logic modules and the host adapters for the
//! simulation binary and for integration testing.  Hardware access goes
//! through the port traits in [`app::ports`] and the `embedded-hal`
//! traits, so the same logic runs against simulated peripherals here.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calculator;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod lock;
pub mod power;
pub mod sensors;
pub mod stopwatch;
