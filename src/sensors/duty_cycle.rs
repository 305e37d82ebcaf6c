//! Duty-cycle measurement from four consecutive INT0 edges.
//!
//! Timer1 counts freely; INT0 starts on the rising edge.
//!
//! | Edge | Sensed  | Action                          |
//! |------|---------|---------------------------------|
//! | 1    | rising  | clear Timer1, sense falling     |
//! | 2    | falling | `high = TCNT1`, sense rising    |
//! | 3    | rising  | `period = TCNT1`, sense falling |
//! | 4    | falling | `pph = TCNT1`, stop, disarm     |
//!
//! `duty = (pph - period) / (pph - high) * 100`, truncated.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info};

use crate::app::ports::{TickControl, TickHandler, TimerPort};
use crate::error::{DutyCycleError, Result};

/// Which INT0 edge fires next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Interrupt-side view of Timer1 plus the INT0 sense control.
pub trait CaptureHardware: Send {
    fn counter(&self) -> u16;

    fn clear_counter(&mut self);

    fn sense(&mut self, edge: Edge);

    /// Stop the timer clock and mask INT0.
    fn stop(&mut self);
}

/// The three timer snapshots taken on edges 2–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSamples {
    pub high: u16,
    pub period: u16,
    pub period_plus_high: u16,
}

impl EdgeSamples {
    pub fn duty_cycle(&self) -> core::result::Result<u8, DutyCycleError> {
        duty_cycle(self.high, self.period, self.period_plus_high)
    }
}

/// Integer duty cycle in percent.
pub fn duty_cycle(
    high: u16,
    period: u16,
    period_plus_high: u16,
) -> core::result::Result<u8, DutyCycleError> {
    if period_plus_high == high {
        return Err(DutyCycleError::ZeroDivisor);
    }
    if !(high <= period && period <= period_plus_high) {
        return Err(DutyCycleError::DegenerateSamples);
    }
    let on = (period_plus_high - period) as u32;
    let span = (period_plus_high - high) as u32;
    Ok((on * 100 / span) as u8)
}

// ───────────────────────────────────────────────────────────────
// Edge handler
// ───────────────────────────────────────────────────────────────

/// Completion signal shared between the edge handler and the waiter.
pub struct CaptureResult {
    done: Signal<CriticalSectionRawMutex, EdgeSamples>,
}

impl CaptureResult {
    pub const fn new() -> Self {
        Self {
            done: Signal::new(),
        }
    }

    /// Samples if the capture already finished.
    pub fn try_take(&self) -> Option<EdgeSamples> {
        self.done.try_take()
    }

    fn wait(&self) -> EdgeSamples {
        futures_lite::future::block_on(self.done.wait())
    }
}

impl Default for CaptureResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-edge state machine bound to the INT0 interrupt.
pub struct EdgeCapture<H> {
    hw: H,
    edges: u8,
    high: u16,
    period: u16,
    result: Arc<CaptureResult>,
}

impl<H: CaptureHardware> EdgeCapture<H> {
    pub fn new(mut hw: H, result: Arc<CaptureResult>) -> Self {
        hw.sense(Edge::Rising);
        Self {
            hw,
            edges: 0,
            high: 0,
            period: 0,
            result,
        }
    }
}

impl<H: CaptureHardware> TickHandler for EdgeCapture<H> {
    fn on_tick(&mut self) -> TickControl {
        self.edges += 1;
        match self.edges {
            1 => {
                self.hw.clear_counter();
                self.hw.sense(Edge::Falling);
            }
            2 => {
                self.high = self.hw.counter();
                self.hw.sense(Edge::Rising);
            }
            3 => {
                self.period = self.hw.counter();
                self.hw.sense(Edge::Falling);
            }
            _ => {
                let samples = EdgeSamples {
                    high: self.high,
                    period: self.period,
                    period_plus_high: self.hw.counter(),
                };
                self.hw.clear_counter();
                self.hw.sense(Edge::Rising);
                self.hw.stop();
                debug!("duty: captured {:?}", samples);
                self.result.done.signal(samples);
                return TickControl::Disarm;
            }
        }
        TickControl::Continue
    }
}

/// Arm a capture on `edges`, block until four edges arrive, and compute
/// the duty cycle.
pub fn measure<H: CaptureHardware + 'static>(edges: &mut impl TimerPort, hw: H) -> Result<u8> {
    let result = Arc::new(CaptureResult::new());
    edges.arm(Box::new(EdgeCapture::new(hw, Arc::clone(&result))))?;
    let samples = result.wait();
    let duty = samples.duty_cycle()?;
    info!("duty: {}% (high={} period={} pph={})", duty, samples.high, samples.period, samples.period_plus_high);
    Ok(duty)
}
