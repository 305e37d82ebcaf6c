//! One password session, driven the same way on either ECU.
//!
//! [`AccessService`] owns the FSM and its context.  Each step it carries
//! out the request the current state posted, through the role port
//! injected at the call site, then advances the FSM with the outcome.
//! The same service runs on both ECUs; only the role differs.
//!
//! ```text
//!                 ┌────────────────────────┐ ──▶ EventSink
//!    RolePort ◀──▶│     AccessService      │
//!  (hmi/control)  │   FSM · AttemptCounter │
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::fsm::context::{FsmContext, Request};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::lock::protocol::BootStatus;
use crate::lock::timed::DoorPhase;

use super::events::AppEvent;
use super::ports::{EventSink, RolePort};

// ───────────────────────────────────────────────────────────────
// AccessService
// ───────────────────────────────────────────────────────────────

/// The access-control sequencer.
pub struct AccessService {
    fsm: Fsm,
    ctx: FsmContext,
    /// Completed access cycles since boot.
    cycles: u64,
    started: bool,
}

impl AccessService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::AwaitingDecision);
        Self {
            fsm,
            ctx,
            cycles: 0,
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Exchange the boot status (running the first-login password flow
    /// when storage is blank), then enter `AwaitingDecision`.
    ///
    /// Retrying after `Error::Link(LinkError::Timeout)` is safe on the
    /// control ECU; see [`step`](Self::step).
    pub fn start(
        &mut self,
        role: &mut impl RolePort,
        sink: &mut impl EventSink,
    ) -> Result<BootStatus> {
        let status = role.bootstrap()?;
        if status == BootStatus::FirstTimeLogin {
            sink.emit(&AppEvent::PasswordChanged);
        }
        self.fsm.start(&mut self.ctx);
        self.started = true;
        sink.emit(&AppEvent::Started(status));
        info!("{}: access service started ({:?})", role.name(), status);
        Ok(status)
    }

    // ── Stepping ──────────────────────────────────────────────

    /// Carry out the pending request, then advance the FSM once.
    ///
    /// On error the request stays pending.  A `Link(Timeout)` that hits
    /// before the first byte of a request arrives can be retried: the
    /// READY the abandoned wait sent is skipped by the peer's next
    /// receive.  This is the control ECU idling while the user is at the
    /// keypad.  A timeout partway through a multi-byte exchange, or any
    /// timeout on the interface ECU (which has already consumed keypad
    /// input), leaves the two ECUs out of step; restart both.
    pub fn step(&mut self, role: &mut impl RolePort, sink: &mut impl EventSink) -> Result<()> {
        if !self.started {
            warn!("{}: step before start, starting FSM without bootstrap", role.name());
            self.fsm.start(&mut self.ctx);
            self.started = true;
        }
        let prev_state = self.fsm.current_state();

        self.fulfil(role, sink)?;
        self.fsm.step(&mut self.ctx);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
            if new_state == StateId::AwaitingDecision {
                self.cycles += 1;
            }
        }
        Ok(())
    }

    /// Step until the FSM is back in `AwaitingDecision`: one decision,
    /// its password attempts, and the resulting action or lockout.
    pub fn run_cycle(
        &mut self,
        role: &mut impl RolePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        loop {
            self.step(role, sink)?;
            if self.fsm.current_state() == StateId::AwaitingDecision {
                return Ok(());
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Mismatches counted in the running cycle.
    pub fn attempts(&self) -> u8 {
        self.ctx.attempts.count()
    }

    /// Request the current state is waiting on.
    pub fn pending_request(&self) -> Request {
        self.ctx.request
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate the posted request into role-port calls.
    fn fulfil(&mut self, role: &mut impl RolePort, sink: &mut impl EventSink) -> Result<()> {
        match self.ctx.request {
            Request::Idle => return Ok(()),
            Request::Decision => {
                let decision = role.decision()?;
                self.ctx.decision = Some(decision);
                sink.emit(&AppEvent::DecisionMade(decision));
            }
            Request::CurrentPassword => {
                let verdict = role.check_password()?;
                self.ctx.verdict = Some(verdict);
                sink.emit(&AppEvent::VerdictReached(verdict));
            }
            Request::NewPassword => {
                role.change_password()?;
                sink.emit(&AppEvent::PasswordChanged);
            }
            Request::DoorCycle => {
                for phase in DoorPhase::SEQUENCE {
                    role.door_phase(phase, phase.ticks(&self.ctx.config))?;
                    sink.emit(&AppEvent::DoorPhaseDone(phase));
                }
            }
            Request::Rejection { attempts, lockout } => {
                let max_attempts = self.ctx.attempts.limit();
                sink.emit(&AppEvent::AttemptFailed {
                    attempts,
                    max_attempts,
                });
                role.rejected(attempts, max_attempts)?;
                if lockout {
                    sink.emit(&AppEvent::AlarmRaised);
                    role.alarm(self.ctx.config.alarm_ticks)?;
                    sink.emit(&AppEvent::AlarmCleared);
                }
            }
        }
        self.ctx.request = Request::Idle;
        self.ctx.request_done = true;
        Ok(())
    }
}
