//! Tick-counted timed actions (door phases, alarm).
//!
//! A [`Countdown`] is armed on the tick timer for every phase.  It bumps the
//! shared [`PhaseClock`] counter once per tick and, at the limit, zeroes the
//! counter, signals [`LockState::Opened`] and disarms.  The sequence blocks
//! on that signal instead of spinning on a flag.
//!
//! ```text
//!  timer tick ──▶ Countdown::on_tick ──▶ ticks += 1
//!                                         │ ticks == limit
//!                                         ▼
//!  run_timed ◀──────── Signal(Opened) ◀── disarm
//! ```

use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::debug;

use crate::app::ports::{TickControl, TickHandler, TimerPort};
use crate::config::SystemConfig;
use crate::error::ActuatorError;

/// Whether the timed action is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Opened,
}

/// The three door phases, in the only order they ever run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorPhase {
    /// Forward rotation.
    Opening,
    /// Motor stopped, door held open.
    Holding,
    /// Reverse rotation.
    Closing,
}

impl DoorPhase {
    pub const SEQUENCE: [DoorPhase; 3] = [Self::Opening, Self::Holding, Self::Closing];

    pub fn ticks(self, config: &SystemConfig) -> u8 {
        match self {
            Self::Opening | Self::Closing => config.motor_run_ticks,
            Self::Holding => config.motor_hold_ticks,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// PhaseClock
// ───────────────────────────────────────────────────────────────

/// Tick counter plus completion signal shared between the sequence
/// (single reader) and the armed countdown (single writer).
pub struct PhaseClock {
    ticks: AtomicU8,
    done: Signal<CriticalSectionRawMutex, LockState>,
}

impl PhaseClock {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU8::new(0),
            done: Signal::new(),
        }
    }

    /// Ticks counted in the running phase.
    pub fn ticks(&self) -> u8 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn state(&self) -> LockState {
        if self.done.signaled() {
            LockState::Opened
        } else {
            LockState::Unlocked
        }
    }

    fn begin(&self) {
        self.ticks.store(0, Ordering::Release);
        self.done.reset();
    }

    fn wait(&self) -> LockState {
        futures_lite::future::block_on(self.done.wait())
    }
}

impl Default for PhaseClock {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Countdown handler
// ───────────────────────────────────────────────────────────────

/// Counts ticks up to `limit` on behalf of one phase.
pub struct Countdown {
    clock: Arc<PhaseClock>,
    limit: u8,
}

impl Countdown {
    pub fn new(clock: Arc<PhaseClock>, limit: u8) -> Self {
        Self { clock, limit }
    }
}

impl TickHandler for Countdown {
    fn on_tick(&mut self) -> TickControl {
        let ticks = self.clock.ticks.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if ticks < self.limit {
            return TickControl::Continue;
        }
        self.clock.ticks.store(0, Ordering::Release);
        self.clock.done.signal(LockState::Opened);
        TickControl::Disarm
    }
}

/// Arm a countdown of `ticks` and block until it signals completion.
/// The counter starts from zero regardless of what the last phase left.
pub fn run_timed(
    timer: &mut impl TimerPort,
    clock: &Arc<PhaseClock>,
    ticks: u8,
) -> Result<(), ActuatorError> {
    clock.begin();
    timer.arm(Box::new(Countdown::new(Arc::clone(clock), ticks)))?;
    let state = clock.wait();
    debug!("timed action: {} ticks elapsed, state={:?}", ticks, state);
    Ok(())
}
