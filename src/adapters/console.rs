//! Console stand-ins for the keypad, the character LCD and busy-wait
//! delays.
//!
//! | Adapter          | Implements   | Backed by                      |
//! |------------------|--------------|--------------------------------|
//! | `ScriptedKeypad` | KeypadPort   | a queue of pre-decoded keys    |
//! | `TextDisplay`    | DisplayPort  | four row buffers + the logger  |
//! | `StdDelay`       | DelayNs      | `std::thread::sleep`           |

use std::collections::VecDeque;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::{DisplayPort, InputError, Key, KeypadPort};

// ── Keypad ─────────────────────────────────────────────────────

/// Replays a fixed key sequence, then reports [`InputError::Exhausted`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeypad {
    keys: VecDeque<Key>,
}

impl ScriptedKeypad {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Parse keypad legends; whitespace and unknown characters are skipped.
    pub fn from_legends(script: &str) -> Self {
        Self::new(script.bytes().filter_map(Key::from_ascii))
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeypadPort for ScriptedKeypad {
    fn read_key(&mut self) -> Result<Key, InputError> {
        let key = self.keys.pop_front().ok_or(InputError::Exhausted)?;
        debug!("keypad: {:?}", key);
        Ok(key)
    }
}

// ── Display ────────────────────────────────────────────────────

pub const LCD_ROWS: usize = 4;

/// 4-row character display kept as text.
///
/// Writing past the end of a row extends it, so the screen never
/// truncates what a lab puts there.
#[derive(Debug, Clone)]
pub struct TextDisplay {
    tag: &'static str,
    rows: [String; LCD_ROWS],
    echo: bool,
}

impl TextDisplay {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            rows: Default::default(),
            echo: false,
        }
    }

    /// Log every row change at `info` instead of `debug`.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map(|r| r.trim_end()).unwrap_or("")
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.trim_end())
    }
}

impl DisplayPort for TextDisplay {
    fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    fn show_at(&mut self, row: u8, col: u8, text: &str) {
        let Some(line) = self.rows.get_mut(row as usize) else {
            return;
        };
        let mut chars: Vec<char> = line.chars().collect();
        let col = col as usize;
        if chars.len() < col {
            chars.resize(col, ' ');
        }
        for (i, ch) in text.chars().enumerate() {
            match chars.get_mut(col + i) {
                Some(slot) => *slot = ch,
                None => chars.push(ch),
            }
        }
        *line = chars.into_iter().collect();

        if self.echo {
            info!("lcd({}) [{}] {}", self.tag, row, line.trim_end());
        } else {
            debug!("lcd({}) [{}] {}", self.tag, row, line.trim_end());
        }
    }
}

// ── Delay ──────────────────────────────────────────────────────

/// `_delay_ms` on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            std::thread::sleep(Duration::from_nanos(ns as u64));
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}
