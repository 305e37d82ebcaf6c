//! LM35 temperature sensor on ADC channel 0.
//!
//! 10 mV/°C into a 10-bit ADC referenced to AVCC (5 V), so one count is
//! roughly 0.49 °C.  The speed lab works on the raw count; the Celsius
//! value is for display only.
//!
//! ## Dual-target design
//!
//! Reads through [`AnalogPort`]; on host/test [`SimAdc`] serves an
//! injectable value shared through an atomic.

use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use crate::app::ports::AnalogPort;
use crate::error::SensorError;

const ADC_MAX: u16 = 1023;
const V_REF_MV: u32 = 5000;
const MV_PER_DEGREE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: u16,
}

pub struct TemperatureSensor<A> {
    adc: A,
    channel: u8,
}

impl<A: AnalogPort> TemperatureSensor<A> {
    pub fn new(adc: A, channel: u8) -> Self {
        Self {
            adc,
            channel: channel & 0x07,
        }
    }

    pub fn read(&mut self) -> Result<TemperatureReading, SensorError> {
        let raw = self.adc.read_channel(self.channel)?;
        if raw > ADC_MAX {
            return Err(SensorError::OutOfRange);
        }
        Ok(TemperatureReading {
            raw,
            celsius: adc_to_celsius(raw),
        })
    }
}

fn adc_to_celsius(raw: u16) -> u16 {
    (raw as u32 * V_REF_MV / ADC_MAX as u32 / MV_PER_DEGREE) as u16
}

/// Host-side ADC: every channel returns the injected value.
#[derive(Clone, Default)]
pub struct SimAdc(Arc<AtomicU16>);

impl SimAdc {
    pub fn new(raw: u16) -> Self {
        Self(Arc::new(AtomicU16::new(raw)))
    }

    pub fn set(&self, raw: u16) {
        self.0.store(raw, Ordering::Relaxed);
    }
}

impl AnalogPort for SimAdc {
    fn read_channel(&mut self, _channel: u8) -> Result<u16, SensorError> {
        Ok(self.0.load(Ordering::Relaxed))
    }
}
