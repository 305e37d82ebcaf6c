//! Alarm driver: buzzer (PA0) and warning LED (PA5), switched together.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Alarm<B, L> {
    buzzer: B,
    led: L,
    on: bool,
}

impl<B: OutputPin, L: OutputPin> Alarm<B, L> {
    pub fn new(buzzer: B, led: L) -> Result<Self, ActuatorError> {
        let mut alarm = Self {
            buzzer,
            led,
            on: true,
        };
        alarm.off()?;
        Ok(alarm)
    }

    pub fn on(&mut self) -> Result<(), ActuatorError> {
        self.led.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.buzzer.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.buzzer.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.led.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = false;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
