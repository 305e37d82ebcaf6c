//! Four-function keypad calculator on the 4x16 LCD.
//!
//! ```text
//!  row 0  M.T Diploma 51
//!  row 1  Enter operation:
//!  row 2  12*34=408.00
//! ```
//!
//! Operands are signed 16-bit; the result is computed in `f32` and shown
//! with two decimals.

use core::fmt::Write as _;

use log::{debug, info, warn};

use crate::app::ports::{DisplayPort, Key, KeypadPort};
use crate::error::{CalcError, Error, Result};

const TITLE: &str = "M.T Diploma 51";
const PROMPT: &str = "Enter operation:";
const WORK_ROW: u8 = 2;
const LCD_COLS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Plus => Some(Self::Add),
            Key::Minus => Some(Self::Sub),
            Key::Star => Some(Self::Mul),
            Key::Slash => Some(Self::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    pub fn apply(self, lhs: i16, rhs: i16) -> core::result::Result<f32, CalcError> {
        let (a, b) = (lhs as f32, rhs as f32);
        match self {
            Self::Add => Ok(a + b),
            Self::Sub => Ok(a - b),
            Self::Mul => Ok(a * b),
            Self::Div if rhs == 0 => Err(CalcError::DivisionByZero),
            Self::Div => Ok(a / b),
        }
    }
}

/// Accumulate a decimal digit into an operand.
fn push_digit(operand: i16, digit: u8) -> core::result::Result<i16, CalcError> {
    operand
        .checked_mul(10)
        .and_then(|v| v.checked_add(digit as i16))
        .ok_or(CalcError::Overflow)
}

/// What a key press produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Entry continues.
    Pending,
    /// `=` evaluated; the calculator is reset for the next expression.
    Result(f32),
    Cleared,
}

pub struct Calculator<D> {
    display: D,
    lhs: i16,
    rhs: i16,
    operator: Option<Operator>,
    /// Digits entered for the second operand.
    rhs_started: bool,
}

impl<D: DisplayPort> Calculator<D> {
    pub fn new(mut display: D) -> Self {
        show_banner(&mut display);
        Self {
            display,
            lhs: 0,
            rhs: 0,
            operator: None,
            rhs_started: false,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Handle one key.
    ///
    /// Errors reset the entry and leave `ERROR` on the work row.
    pub fn press(&mut self, key: Key) -> Result<Outcome> {
        match self.try_press(key) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("calc: {}", e);
                self.reset();
                self.show_work("ERROR");
                Err(e.into())
            }
        }
    }

    fn try_press(&mut self, key: Key) -> core::result::Result<Outcome, CalcError> {
        match key {
            Key::Clear => {
                self.display.clear();
                show_banner(&mut self.display);
                self.reset();
                debug!("calc: cleared");
                return Ok(Outcome::Cleared);
            }
            Key::Digit(d) => match self.operator {
                None => self.lhs = push_digit(self.lhs, d)?,
                Some(_) => {
                    self.rhs = push_digit(self.rhs, d)?;
                    self.rhs_started = true;
                }
            },
            Key::Equals => {
                let result = match self.operator {
                    Some(op) => op.apply(self.lhs, self.rhs)?,
                    None => self.lhs as f32,
                };
                let mut line = self.expression();
                let _ = write!(line, "={:.2}", result);
                self.show_work(&line);
                info!("calc: {}", line);
                self.reset();
                return Ok(Outcome::Result(result));
            }
            other => {
                if let Some(op) = Operator::from_key(other) {
                    self.operator = Some(op);
                }
            }
        }
        let line = self.expression();
        self.show_work(&line);
        Ok(Outcome::Pending)
    }

    /// Run keys from the keypad until it runs dry, returning every result.
    pub fn run(&mut self, keypad: &mut impl KeypadPort) -> Vec<core::result::Result<f32, Error>> {
        let mut results = Vec::new();
        while let Ok(key) = keypad.read_key() {
            match self.press(key) {
                Ok(Outcome::Result(v)) => results.push(Ok(v)),
                Ok(_) => {}
                Err(e) => results.push(Err(e)),
            }
        }
        results
    }

    fn expression(&self) -> heapless::String<32> {
        let mut line = heapless::String::new();
        let _ = write!(line, "{}", self.lhs);
        if let Some(op) = self.operator {
            let _ = write!(line, "{}", op.symbol());
            if self.rhs_started {
                let _ = write!(line, "{}", self.rhs);
            }
        }
        line
    }

    /// Overwrite the whole work row so a shorter line leaves no tail.
    fn show_work(&mut self, text: &str) {
        let mut padded = heapless::String::<32>::new();
        let _ = write!(padded, "{:<width$}", text, width = LCD_COLS);
        self.display.show_at(WORK_ROW, 0, &padded);
    }

    fn reset(&mut self) {
        self.lhs = 0;
        self.rhs = 0;
        self.operator = None;
        self.rhs_started = false;
    }
}

fn show_banner(display: &mut impl DisplayPort) {
    display.show_at(0, 0, TITLE);
    display.show_at(1, 0, PROMPT);
}
