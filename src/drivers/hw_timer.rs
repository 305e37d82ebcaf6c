//! Tick timer backends implementing [`TimerPort`].
//!
//! The hardware timer runs in CTC mode at F_CPU/1024 and fires its compare
//! interrupt every tick; here that interrupt is a dedicated thread.
//!
//! - [`ThreadTimer`]: one background thread per armed handler, sleeping
//!   the tick period between calls.  Used by the simulation binary.
//! - [`ImmediateTimer`]: calls the handler back-to-back on the arming
//!   thread until it disarms.  Used by tests and fast simulation.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::app::ports::{TickControl, TickHandler, TimerPort};
use crate::error::ActuatorError;

// ───────────────────────────────────────────────────────────────
// ThreadTimer
// ───────────────────────────────────────────────────────────────

pub struct ThreadTimer {
    period: Duration,
    name: &'static str,
    running: Option<JoinHandle<u32>>,
}

impl ThreadTimer {
    pub fn new(name: &'static str, period_ms: u32) -> Self {
        Self {
            period: Duration::from_millis(period_ms as u64),
            name,
            running: None,
        }
    }

    /// Wait for the previous handler (if any) to disarm.
    fn reap(&mut self) {
        if let Some(handle) = self.running.take() {
            match handle.join() {
                Ok(ticks) => debug!("hw_timer({}): previous handler ran {} ticks", self.name, ticks),
                Err(_) => warn!("hw_timer({}): tick thread panicked", self.name),
            }
        }
    }
}

impl TimerPort for ThreadTimer {
    fn arm(&mut self, mut handler: Box<dyn TickHandler>) -> Result<(), ActuatorError> {
        self.reap();
        let period = self.period;
        let handle = thread::Builder::new()
            .name(format!("tick-{}", self.name))
            .spawn(move || {
                let mut ticks = 0u32;
                loop {
                    thread::sleep(period);
                    ticks += 1;
                    if handler.on_tick() == TickControl::Disarm {
                        return ticks;
                    }
                }
            })
            .map_err(|_| ActuatorError::TimerUnavailable)?;
        self.running = Some(handle);
        Ok(())
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.reap();
    }
}

// ───────────────────────────────────────────────────────────────
// ImmediateTimer
// ───────────────────────────────────────────────────────────────

/// Delivers every tick synchronously inside `arm`.
#[derive(Debug, Default)]
pub struct ImmediateTimer {
    delivered: u64,
    armed: u32,
}

impl ImmediateTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks delivered since construction.
    pub fn ticks_delivered(&self) -> u64 {
        self.delivered
    }

    /// Handlers armed since construction.
    pub fn times_armed(&self) -> u32 {
        self.armed
    }
}

impl TimerPort for ImmediateTimer {
    fn arm(&mut self, mut handler: Box<dyn TickHandler>) -> Result<(), ActuatorError> {
        self.armed += 1;
        loop {
            self.delivered += 1;
            if handler.on_tick() == TickControl::Disarm {
                return Ok(());
            }
        }
    }
}
