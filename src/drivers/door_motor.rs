//! Door motor driver (L293D H-bridge, two direction lines).
//!
//! | IN1 | IN2 | Motion            |
//! |-----|-----|-------------------|
//! |  1  |  0  | clockwise (open)  |
//! |  0  |  1  | anticlockwise     |
//! |  0  |  0  | stop              |
//!
//! The driver is a dumb actuator; phase timing lives in the control ECU.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Clockwise,
    Anticlockwise,
}

pub struct DoorMotor<A, B> {
    in1: A,
    in2: B,
    state: MotorState,
}

impl<A: OutputPin, B: OutputPin> DoorMotor<A, B> {
    /// Take the pins and drive both low.
    pub fn new(in1: A, in2: B) -> Result<Self, ActuatorError> {
        let mut motor = Self {
            in1,
            in2,
            state: MotorState::Stopped,
        };
        motor.stop()?;
        Ok(motor)
    }

    pub fn clockwise(&mut self) -> Result<(), ActuatorError> {
        self.drive(true, false)?;
        self.state = MotorState::Clockwise;
        Ok(())
    }

    pub fn anticlockwise(&mut self) -> Result<(), ActuatorError> {
        self.drive(false, true)?;
        self.state = MotorState::Anticlockwise;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.drive(false, false)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    fn drive(&mut self, in1: bool, in2: bool) -> Result<(), ActuatorError> {
        // Release the active line first so both are never high together.
        if in1 {
            self.in2.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.in1.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
        } else {
            self.in1.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
            self.in2
                .set_state(in2.into())
                .map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        Ok(())
    }
}
