//! Simulated GPIO and PWM for the host build.
//!
//! Levels live behind `Arc`s so a test or the simulation binary can keep
//! a clone and observe what a driver wrote.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use log::trace;

/// Push-pull output pin.
#[derive(Clone)]
pub struct SimPin {
    name: &'static str,
    level: Arc<AtomicBool>,
}

impl SimPin {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    fn drive(&self, high: bool) {
        if self.level.swap(high, Ordering::AcqRel) != high {
            trace!("gpio: {} -> {}", self.name, if high { "HIGH" } else { "LOW" });
        }
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// 8-bit fast-PWM channel (Timer0 OC0 on the real part).
#[derive(Clone, Default)]
pub struct SimPwm {
    duty: Arc<AtomicU16>,
}

impl SimPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Acquire)
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        trace!("pwm: OCR0={}", duty);
        self.duty.store(duty, Ordering::Release);
        Ok(())
    }
}
