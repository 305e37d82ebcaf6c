//! Variable-speed DC motor for the temperature lab.
//!
//! Speed is the Timer0 fast-PWM compare value (OC0, 0-255) on the L293D
//! enable line; two direction lines select the rotation.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` 1.0 pins, so the same driver runs against
//! real peripherals or recording mocks.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::control::speed::Rotation;
use crate::error::ActuatorError;

pub struct FanMotor<P, A, B> {
    pwm: P,
    in1: A,
    in2: B,
    duty: u8,
    rotation: Rotation,
}

impl<P: SetDutyCycle, A: OutputPin, B: OutputPin> FanMotor<P, A, B> {
    /// Start stopped, clockwise.
    pub fn new(pwm: P, in1: A, in2: B) -> Result<Self, ActuatorError> {
        let mut motor = Self {
            pwm,
            in1,
            in2,
            duty: 0,
            rotation: Rotation::Clockwise,
        };
        motor.set_duty(0)?;
        motor.set_rotation(Rotation::Clockwise)?;
        Ok(motor)
    }

    /// Set the 8-bit compare value.
    pub fn set_duty(&mut self, duty: u8) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fraction(duty as u16, u8::MAX as u16)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty = duty;
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), ActuatorError> {
        let (a, b) = match rotation {
            Rotation::Clockwise => (true, false),
            Rotation::Anticlockwise => (false, true),
        };
        self.in1.set_state(a.into()).map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.in2.set_state(b.into()).map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.rotation = rotation;
        Ok(())
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }
}
