//! Idle-sleep press counter.
//!
//! The MCU idles until the INT2 button wakes it.  The interrupt side
//! ([`WakeSource::on_press`]) counts the press, raises the PB1 activity
//! indicator and signals the loop; the loop ([`SleepCounter`]) redraws the
//! count, lowers the indicator and goes back to sleep.

use core::cell::RefCell;
use core::fmt::Write as _;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::app::ports::{DisplayPort, TickControl, TickHandler};
use crate::error::{ActuatorError, Result};

const COUNT_LABEL: &str = "NUMBER OF PRESS:";
const COUNT_COL: u8 = 16;

// ── Interrupt side ──────────────────────────────────────────────

/// State shared between the wake interrupt and the idle loop.
pub struct WakeSource<P> {
    presses: AtomicU8,
    wake: Signal<CriticalSectionRawMutex, u8>,
    indicator: Mutex<CriticalSectionRawMutex, RefCell<P>>,
}

impl<P: OutputPin> WakeSource<P> {
    pub fn new(indicator: P) -> Self {
        Self {
            presses: AtomicU8::new(0),
            wake: Signal::new(),
            indicator: Mutex::new(RefCell::new(indicator)),
        }
    }

    /// INT2 handler body. Returns the new press count.
    pub fn on_press(&self) -> core::result::Result<u8, ActuatorError> {
        let n = self.presses.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.set_indicator(true)?;
        self.wake.signal(n);
        Ok(n)
    }

    pub fn presses(&self) -> u8 {
        self.presses.load(Ordering::Acquire)
    }

    /// Sleep until the next press; returns the count at wake-up.
    fn idle(&self) -> u8 {
        futures_lite::future::block_on(self.wake.wait());
        self.presses()
    }

    fn set_indicator(&self, high: bool) -> core::result::Result<(), ActuatorError> {
        self.indicator.lock(|pin| {
            pin.borrow_mut()
                .set_state(high.into())
                .map_err(|_| ActuatorError::GpioWriteFailed)
        })
    }
}

/// Simulated button: one press per tick, `count` presses in total.
pub struct ButtonPresser<P> {
    source: Arc<WakeSource<P>>,
    remaining: u8,
}

impl<P> ButtonPresser<P> {
    pub fn new(source: Arc<WakeSource<P>>, count: u8) -> Self {
        Self {
            source,
            remaining: count,
        }
    }
}

impl<P: OutputPin + Send> TickHandler for ButtonPresser<P> {
    fn on_tick(&mut self) -> TickControl {
        if self.remaining == 0 {
            return TickControl::Disarm;
        }
        self.remaining -= 1;
        if let Err(e) = self.source.on_press() {
            debug!("power: press failed: {}", e);
        }
        if self.remaining == 0 {
            TickControl::Disarm
        } else {
            TickControl::Continue
        }
    }
}

// ── Idle loop ───────────────────────────────────────────────────

pub struct SleepCounter<P, D> {
    source: Arc<WakeSource<P>>,
    display: D,
    shown: u8,
}

impl<P: OutputPin, D: DisplayPort> SleepCounter<P, D> {
    /// Show the greeting screens, then the press counter.
    pub fn new(source: Arc<WakeSource<P>>, mut display: D, delay: &mut impl DelayNs) -> Self {
        display.clear();
        display.show_at(0, 5, "HELLO DUDE");
        delay.delay_ms(1000);
        display.clear();
        display.show_at(0, 5, "SLEEP MODE");
        delay.delay_ms(500);
        display.clear();
        display.show_at(0, 0, COUNT_LABEL);

        let mut counter = Self {
            source,
            display,
            shown: 0,
        };
        let n = counter.source.presses();
        counter.show_count(n);
        counter
    }

    /// One idle period: sleep, then redraw and lower the indicator.
    pub fn sleep_once(&mut self) -> Result<u8> {
        let n = self.source.idle();
        self.show_count(n);
        self.source.set_indicator(false)?;
        debug!("power: woke, presses={}", n);
        Ok(n)
    }

    /// Sleep repeatedly until at least `target` presses are counted.
    pub fn run_until(&mut self, target: u8) -> Result<u8> {
        let mut n = self.source.presses();
        if n != self.shown {
            self.show_count(n);
        }
        while n < target {
            n = self.sleep_once()?;
        }
        info!("power: {} presses", n);
        Ok(n)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn show_count(&mut self, n: u8) {
        let mut text = heapless::String::<4>::new();
        let _ = write!(text, "{}", n);
        self.display.show_at(0, COUNT_COL, &text);
        self.shown = n;
    }
}
