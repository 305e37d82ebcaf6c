//! Timings, thresholds and limits for the lock and the labs.
//!
//! All tunable parameters for the lab firmware.
//! Values can be overridden from the EEPROM config block.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Access control ---
    /// Consecutive mismatches that trigger the alarm
    pub max_attempts: u8,
    /// Alarm duration (ticks)
    pub alarm_ticks: u8,

    // --- Door motor ---
    /// Forward / reverse rotation time (ticks)
    pub motor_run_ticks: u8,
    /// Hold time with the door fully open (ticks)
    pub motor_hold_ticks: u8,

    // --- Timing ---
    /// Period of one timer tick (milliseconds)
    pub tick_period_ms: u32,
    /// Byte-link receive timeout; `None` blocks forever
    pub link_timeout_ms: Option<u32>,
    /// Settle delay after each key press on the interface ECU (milliseconds)
    pub key_press_delay_ms: u32,
    /// Short status message display time (milliseconds)
    pub short_display_ms: u32,
    /// Long status message display time (milliseconds)
    pub long_display_ms: u32,

    // --- Motor speed lab ---
    /// Upper ADC bounds of the quarter / half / three-quarter speed bands
    pub speed_band_limits: [u16; 3],
    /// PWM duty (0-255) for each band, slowest first
    pub speed_band_duty: [u8; 4],
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Access control
            max_attempts: 3,
            alarm_ticks: 15,

            // Door motor
            motor_run_ticks: 15,
            motor_hold_ticks: 3,

            // Timing
            tick_period_ms: 1000, // 8000 compare matches at F_CPU/1024
            link_timeout_ms: None,
            key_press_delay_ms: 350,
            short_display_ms: 500,
            long_display_ms: 800,

            // Motor speed
            speed_band_limits: [256, 512, 768],
            speed_band_duty: [64, 128, 192, 255],
        }
    }
}

impl SystemConfig {
    /// Same timings with every delay collapsed to zero, for fast simulation.
    pub fn instant() -> Self {
        Self {
            tick_period_ms: 1,
            key_press_delay_ms: 0,
            short_display_ms: 0,
            long_display_ms: 0,
            ..Self::default()
        }
    }
}
