//! Temperature-banded motor speed with a direction toggle.
//!
//! The sensor sits on ADC channel 0; its 10-bit reading picks one of four
//! PWM duties.  A reading of exactly zero leaves the motor where it was.
//! The INT1 button reverses the rotation.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, info};

use crate::config::SystemConfig;
use crate::drivers::fan_motor::FanMotor;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    Anticlockwise,
}

impl Rotation {
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::Anticlockwise,
            Self::Anticlockwise => Self::Clockwise,
        }
    }
}

/// PWM duty for an ADC reading, or `None` for a zero reading.
pub fn duty_for_reading(reading: u16, config: &SystemConfig) -> Option<u8> {
    if reading == 0 {
        return None;
    }
    let band = config
        .speed_band_limits
        .iter()
        .position(|limit| reading <= *limit)
        .unwrap_or(config.speed_band_limits.len());
    Some(config.speed_band_duty[band])
}

/// Drives a [`FanMotor`] from successive ADC readings.
pub struct SpeedController<P, A, B> {
    motor: FanMotor<P, A, B>,
    config: SystemConfig,
    last_reading: u16,
}

impl<P: SetDutyCycle, A: OutputPin, B: OutputPin> SpeedController<P, A, B> {
    pub fn new(motor: FanMotor<P, A, B>, config: SystemConfig) -> Self {
        Self {
            motor,
            config,
            last_reading: 0,
        }
    }

    /// Apply one ADC sample.  Returns the duty now in effect.
    pub fn update(&mut self, reading: u16) -> Result<u8, ActuatorError> {
        self.last_reading = reading;
        if let Some(duty) = duty_for_reading(reading, &self.config) {
            if duty != self.motor.duty() {
                info!("speed: ADC={} -> duty {}", reading, duty);
                self.motor.set_duty(duty)?;
            }
        } else {
            debug!("speed: zero reading, keeping duty {}", self.motor.duty());
        }
        Ok(self.motor.duty())
    }

    /// Direction-button handler.
    pub fn reverse(&mut self) -> Result<Rotation, ActuatorError> {
        let next = self.motor.rotation().reversed();
        self.motor.set_rotation(next)?;
        info!("speed: rotation now {:?}", next);
        Ok(next)
    }

    pub fn last_reading(&self) -> u16 {
        self.last_reading
    }

    pub fn motor(&self) -> &FanMotor<P, A, B> {
        &self.motor
    }
}
