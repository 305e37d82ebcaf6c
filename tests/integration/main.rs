//! Host-side integration tests.  The door lock runs both ECUs over an
//! in-memory link; the labs use the simulated pins, ADC and timers.

mod door_lock_tests;
mod lab_tests;
mod mock_hw;
