//! Controller-side ECU: owns the EEPROM, the door motor, and the alarm.
//!
//! Answers the interface ECU over the byte link and never talks to the
//! user directly.

use std::sync::Arc;

use log::{info, warn};

use crate::app::ports::{AlarmPort, DoorPort, LinkPort, RolePort, StoragePort, TimerPort};
use crate::error::Result;

use super::password::{self, Password, Verdict};
use super::protocol::{self, BootStatus, Decision};
use super::timed::{DoorPhase, PhaseClock, run_timed};

/// Control ECU.  `H` drives both the door motor and the alarm outputs.
pub struct ControlEcu<L, S, H, T> {
    link: L,
    store: S,
    hw: H,
    timer: T,
    clock: Arc<PhaseClock>,
    /// Status already sent to the interface ECU, so a retried bootstrap
    /// only resumes the password wait.
    announced: Option<BootStatus>,
}

impl<L, S, H, T> ControlEcu<L, S, H, T>
where
    L: LinkPort,
    S: StoragePort,
    H: DoorPort + AlarmPort,
    T: TimerPort,
{
    pub fn new(link: L, store: S, hw: H, timer: T) -> Self {
        Self {
            link,
            store,
            hw,
            timer,
            clock: Arc::new(PhaseClock::new()),
            announced: None,
        }
    }

    /// Shared tick state, for observers.
    pub fn clock(&self) -> &Arc<PhaseClock> {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Take five digits off the link and persist them.
    fn receive_new_password(&mut self) -> Result<()> {
        let raw = protocol::receive_digits(&mut self.link)?;
        let pw = Password::new(raw)?;
        pw.save(&mut self.store)?;
        info!("control: new password stored");
        Ok(())
    }
}

impl<L, S, H, T> RolePort for ControlEcu<L, S, H, T>
where
    L: LinkPort,
    S: StoragePort,
    H: DoorPort + AlarmPort,
    T: TimerPort,
{
    fn name(&self) -> &'static str {
        "control"
    }

    fn bootstrap(&mut self) -> Result<BootStatus> {
        let status = match self.announced {
            Some(status) => status,
            None => {
                let status = if password::is_first_login(&self.store)? {
                    BootStatus::FirstTimeLogin
                } else {
                    BootStatus::AnyTimeLogin
                };
                protocol::send(&mut self.link, status.to_byte())?;
                self.announced = Some(status);
                status
            }
        };
        if status == BootStatus::FirstTimeLogin {
            info!("control: EEPROM erased, waiting for first password");
            self.receive_new_password()?;
        }
        Ok(status)
    }

    fn decision(&mut self) -> Result<Decision> {
        loop {
            let byte = protocol::receive(&mut self.link)?;
            match Decision::from_byte(byte) {
                Ok(d) => return Ok(d),
                Err(e) => warn!("control: {}, asking again", e),
            }
        }
    }

    fn check_password(&mut self) -> Result<Verdict> {
        let candidate = protocol::receive_digits(&mut self.link)?;
        let stored = Password::load(&self.store)?;
        let verdict = password::compare(&candidate, &stored);
        protocol::send(&mut self.link, verdict.to_byte())?;
        Ok(verdict)
    }

    fn change_password(&mut self) -> Result<()> {
        self.receive_new_password()
    }

    fn door_phase(&mut self, phase: DoorPhase, ticks: u8) -> Result<()> {
        match phase {
            DoorPhase::Opening => self.hw.rotate_forward()?,
            DoorPhase::Holding => self.hw.stop()?,
            DoorPhase::Closing => self.hw.rotate_reverse()?,
        }
        run_timed(&mut self.timer, &self.clock, ticks)?;
        self.hw.stop()?;
        Ok(())
    }

    fn rejected(&mut self, attempts: u8, max_attempts: u8) -> Result<()> {
        warn!("control: wrong password ({}/{})", attempts, max_attempts);
        Ok(())
    }

    fn alarm(&mut self, ticks: u8) -> Result<()> {
        self.hw.alarm_on()?;
        run_timed(&mut self.timer, &self.clock, ticks)?;
        self.hw.alarm_off()?;
        Ok(())
    }
}
