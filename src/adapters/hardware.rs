//! Hardware adapter: bridges the control ECU's actuators to the
//! domain port traits.
//!
//! Owns the [`DoorMotor`] and the [`Alarm`], exposing them through
//! [`DoorPort`] and [`AlarmPort`] so [`ControlEcu`](crate::lock::control::ControlEcu)
//! needs a single hardware handle.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{AlarmPort, DoorPort};
use crate::drivers::alarm::Alarm;
use crate::drivers::door_motor::DoorMotor;
use crate::error::ActuatorError;

/// Concrete adapter that combines the door actuators behind port traits.
pub struct DoorHardware<M1, M2, B, L> {
    motor: DoorMotor<M1, M2>,
    alarm: Alarm<B, L>,
}

impl<M1, M2, B, L> DoorHardware<M1, M2, B, L>
where
    M1: OutputPin,
    M2: OutputPin,
    B: OutputPin,
    L: OutputPin,
{
    pub fn new(motor: DoorMotor<M1, M2>, alarm: Alarm<B, L>) -> Self {
        Self { motor, alarm }
    }

    pub fn motor(&self) -> &DoorMotor<M1, M2> {
        &self.motor
    }

    pub fn alarm(&self) -> &Alarm<B, L> {
        &self.alarm
    }
}

// ── DoorPort implementation ───────────────────────────────────

impl<M1, M2, B, L> DoorPort for DoorHardware<M1, M2, B, L>
where
    M1: OutputPin,
    M2: OutputPin,
    B: OutputPin,
    L: OutputPin,
{
    fn rotate_forward(&mut self) -> Result<(), ActuatorError> {
        self.motor.clockwise()
    }

    fn rotate_reverse(&mut self) -> Result<(), ActuatorError> {
        self.motor.anticlockwise()
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.motor.stop()
    }
}

// ── AlarmPort implementation ──────────────────────────────────

impl<M1, M2, B, L> AlarmPort for DoorHardware<M1, M2, B, L>
where
    M1: OutputPin,
    M2: OutputPin,
    B: OutputPin,
    L: OutputPin,
{
    fn alarm_on(&mut self) -> Result<(), ActuatorError> {
        self.alarm.on()
    }

    fn alarm_off(&mut self) -> Result<(), ActuatorError> {
        self.alarm.off()
    }
}
