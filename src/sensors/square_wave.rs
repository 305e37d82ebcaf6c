//! Simulated square-wave input for the duty-cycle lab.
//!
//! [`SquareWave`] plays the part of the INT0 pin: when a handler is armed
//! it jumps simulated time to each next edge of the sensed polarity and
//! calls the handler.  [`SimCapture`] is the matching Timer1 view, sharing
//! the simulated clock through atomics.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::app::ports::{TickControl, TickHandler, TimerPort};
use crate::error::ActuatorError;

use super::duty_cycle::{CaptureHardware, Edge};

/// Hard stop for handlers that never disarm.
const MAX_EDGES: u32 = 64;

#[derive(Debug, Default)]
struct SimClock {
    now: AtomicU32,
    cleared_at: AtomicU32,
    sense_falling: AtomicBool,
    stopped: AtomicBool,
}

/// A periodic signal, high for `high` counts then low for `low` counts,
/// with rising edges at multiples of `high + low`.
pub struct SquareWave {
    high: u32,
    low: u32,
    clock: Arc<SimClock>,
}

impl SquareWave {
    pub fn new(high: u16, low: u16) -> Self {
        Self {
            high: high.max(1) as u32,
            low: low.max(1) as u32,
            clock: Arc::new(SimClock::default()),
        }
    }

    /// Timer1 view bound to this signal's clock.
    pub fn capture(&self) -> SimCapture {
        SimCapture {
            clock: Arc::clone(&self.clock),
        }
    }

    /// Nominal duty cycle in percent.
    pub fn nominal_duty(&self) -> u8 {
        (self.high * 100 / (self.high + self.low)) as u8
    }

    /// First edge of the sensed polarity strictly after `now`.
    fn next_edge(&self, now: u32, falling: bool) -> u32 {
        let period = self.high + self.low;
        let offset = if falling { self.high } else { 0 };
        let k = if now < offset { 0 } else { (now - offset) / period + 1 };
        k * period + offset
    }
}

impl TimerPort for SquareWave {
    fn arm(&mut self, mut handler: Box<dyn TickHandler>) -> Result<(), ActuatorError> {
        self.clock.stopped.store(false, Ordering::Release);
        for _ in 0..MAX_EDGES {
            let now = self.clock.now.load(Ordering::Acquire);
            let falling = self.clock.sense_falling.load(Ordering::Acquire);
            self.clock
                .now
                .store(self.next_edge(now, falling), Ordering::Release);
            if handler.on_tick() == TickControl::Disarm {
                return Ok(());
            }
        }
        Err(ActuatorError::TimerUnavailable)
    }
}

/// Timer1 + INT0 control backed by the simulated clock.
pub struct SimCapture {
    clock: Arc<SimClock>,
}

impl SimCapture {
    pub fn is_stopped(&self) -> bool {
        self.clock.stopped.load(Ordering::Acquire)
    }
}

impl CaptureHardware for SimCapture {
    fn counter(&self) -> u16 {
        let now = self.clock.now.load(Ordering::Acquire);
        now.wrapping_sub(self.clock.cleared_at.load(Ordering::Acquire)) as u16
    }

    fn clear_counter(&mut self) {
        let now = self.clock.now.load(Ordering::Acquire);
        self.clock.cleared_at.store(now, Ordering::Release);
    }

    fn sense(&mut self, edge: Edge) {
        self.clock
            .sense_falling
            .store(edge == Edge::Falling, Ordering::Release);
    }

    fn stop(&mut self) {
        self.clock.stopped.store(true, Ordering::Release);
    }
}
