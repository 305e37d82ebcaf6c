//! Closed-loop control for the motor-speed lab.

pub mod speed;
