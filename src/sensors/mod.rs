//! Sensor subsystem: the duty-cycle capture and the temperature input
//! of the motor-speed lab.

pub mod duty_cycle;
pub mod square_wave;
pub mod temperature;
