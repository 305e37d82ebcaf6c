//! Actuator drivers and the tick timer.

pub mod alarm;
pub mod door_motor;
pub mod fan_motor;
pub mod hw_timer;
