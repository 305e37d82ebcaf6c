//! Interface-side ECU: keypad in, character display out.
//!
//! Collects decisions and passwords from the user, forwards them to the
//! control ECU, and mirrors the control ECU's timed phases on the display
//! with its own tick counter so both sides finish each phase together.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info};

use crate::app::ports::{DisplayPort, Key, KeypadPort, LinkPort, RolePort, TimerPort};
use crate::config::SystemConfig;
use crate::error::Result;

use super::password::{self, PASSWORD_WIDTH, Password, Verdict};
use super::protocol::{self, BootStatus, Decision};
use super::timed::{DoorPhase, PhaseClock, run_timed};

/// Display row the masked digits are echoed on.
const ENTRY_ROW: u8 = 1;
/// Column of the first masked digit.
const ENTRY_COL: u8 = 5;

/// Interface (HMI) ECU.
pub struct InterfaceEcu<L, K, D, T, W> {
    link: L,
    keypad: K,
    display: D,
    timer: T,
    delay: W,
    clock: Arc<PhaseClock>,
    config: SystemConfig,
}

impl<L, K, D, T, W> InterfaceEcu<L, K, D, T, W>
where
    L: LinkPort,
    K: KeypadPort,
    D: DisplayPort,
    T: TimerPort,
    W: DelayNs,
{
    pub fn new(link: L, keypad: K, display: D, timer: T, delay: W, config: SystemConfig) -> Self {
        Self {
            link,
            keypad,
            display,
            timer,
            delay,
            clock: Arc::new(PhaseClock::new()),
            config,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn clock(&self) -> &Arc<PhaseClock> {
        &self.clock
    }

    // ── Display helpers ───────────────────────────────────────

    fn prompt(&mut self, text: &str) {
        self.display.clear();
        self.display.show_at(0, 0, text);
    }

    fn message(&mut self, text: &str, hold_ms: u32) {
        self.prompt(text);
        self.delay.delay_ms(hold_ms);
    }

    fn message2(&mut self, first: &str, second: &str, hold_ms: u32) {
        self.prompt(first);
        self.display.show_at(1, 0, second);
        self.delay.delay_ms(hold_ms);
    }

    // ── Keypad helpers ────────────────────────────────────────

    fn next_key(&mut self) -> Result<Key> {
        let key = self.keypad.read_key()?;
        self.delay.delay_ms(self.config.key_press_delay_ms);
        Ok(key)
    }

    /// Collect five digits.  `*` restarts the entry, `=` submits once all
    /// five are in, every other key is ignored.
    fn read_password(&mut self) -> Result<Password> {
        let mut digits: Vec<u8, PASSWORD_WIDTH> = Vec::new();
        loop {
            match self.next_key()? {
                Key::Digit(d) if !digits.is_full() => {
                    let col = ENTRY_COL + digits.len() as u8;
                    if digits.push(d).is_ok() {
                        self.display.show_at(ENTRY_ROW, col, "*");
                    }
                }
                Key::Star => {
                    digits.clear();
                    self.display.show_at(ENTRY_ROW, ENTRY_COL, "     ");
                    debug!("hmi: entry cleared");
                }
                Key::Equals if digits.is_full() => break,
                _ => {}
            }
        }
        let mut raw = [0u8; PASSWORD_WIDTH];
        raw.copy_from_slice(&digits);
        Ok(Password::new(raw)?)
    }

    /// Enter twice until both agree, then send to the control ECU.
    fn set_new_password(&mut self) -> Result<()> {
        loop {
            self.prompt("ENTER NEW PASSWORD");
            let first = self.read_password()?;
            self.message("PASSWORD SUBMITTED", self.config.short_display_ms);

            self.prompt("RE-ENTER PASSWORD");
            let second = self.read_password()?;

            if password::compare(first.digits(), second.digits()) == Verdict::Matched {
                protocol::send_password(&mut self.link, &first)?;
                self.message("PASSWORD CHANGED", self.config.short_display_ms);
                return Ok(());
            }
            self.message2("PASSWORD UNMATCHED", "TRY AGAIN", self.config.long_display_ms);
        }
    }
}

impl<L, K, D, T, W> RolePort for InterfaceEcu<L, K, D, T, W>
where
    L: LinkPort,
    K: KeypadPort,
    D: DisplayPort,
    T: TimerPort,
    W: DelayNs,
{
    fn name(&self) -> &'static str {
        "hmi"
    }

    fn bootstrap(&mut self) -> Result<BootStatus> {
        let status = BootStatus::from_byte(protocol::receive(&mut self.link)?)?;
        if status == BootStatus::FirstTimeLogin {
            info!("hmi: first login, setting password");
            self.message("FIRST TIME TO LOGIN", self.config.long_display_ms);
            self.set_new_password()?;
        }
        Ok(status)
    }

    fn decision(&mut self) -> Result<Decision> {
        self.prompt("+ : CHANGE PASSWORD");
        self.display.show_at(1, 0, "- : OPEN DOOR");
        let decision = loop {
            match self.next_key()? {
                Key::Plus => break Decision::ChangePassword,
                Key::Minus => break Decision::OpenDoor,
                _ => {}
            }
        };
        protocol::send(&mut self.link, decision.to_byte())?;
        Ok(decision)
    }

    fn check_password(&mut self) -> Result<Verdict> {
        self.prompt("ENTER CURRENT PASSWORD");
        let candidate = self.read_password()?;
        protocol::send_password(&mut self.link, &candidate)?;
        let verdict = Verdict::from_byte(protocol::receive(&mut self.link)?)?;
        Ok(verdict)
    }

    fn change_password(&mut self) -> Result<()> {
        self.set_new_password()
    }

    fn door_phase(&mut self, phase: DoorPhase, ticks: u8) -> Result<()> {
        let text = match phase {
            DoorPhase::Opening => "DOOR IS OPENING",
            DoorPhase::Holding => "DOOR OPEN",
            DoorPhase::Closing => "DOOR IS CLOSING",
        };
        self.prompt(text);
        run_timed(&mut self.timer, &self.clock, ticks)?;
        if phase == DoorPhase::Closing {
            self.message("DOOR CLOSED", self.config.short_display_ms);
        }
        Ok(())
    }

    fn rejected(&mut self, attempts: u8, max_attempts: u8) -> Result<()> {
        self.message("INCORRECT PASSWORD", self.config.long_display_ms);
        if attempts >= max_attempts {
            self.message2(
                "MAXIMUM NUMBER OF",
                "ATTEMPTS EXCEEDED",
                self.config.long_display_ms,
            );
        } else if attempts + 1 == max_attempts {
            self.message2(
                "AFTER 1 MORE FAILED ATTEMPT",
                "SYSTEM WILL BE LOCKED",
                self.config.long_display_ms,
            );
        } else {
            self.message("ENTER PASSWORD AGAIN", self.config.short_display_ms);
        }
        Ok(())
    }

    fn alarm(&mut self, ticks: u8) -> Result<()> {
        self.prompt("SYSTEM IS LOCKED");
        run_timed(&mut self.timer, &self.clock, ticks)?;
        Ok(())
    }
}
