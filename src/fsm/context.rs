//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  Handlers never perform I/O: they post a [`Request`] and the
//! service fulfils it through the role port, writing the outcome
//! (decision, verdict, completion) back here before the next step.

use crate::config::SystemConfig;
use crate::lock::password::{AttemptCounter, Verdict};
use crate::lock::protocol::Decision;

/// I/O the current state needs before it can decide where to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Nothing pending.
    Idle,
    /// Agree on change-password vs open-door.
    Decision,
    /// Transfer a candidate password and obtain the verdict.
    CurrentPassword,
    /// Collect, confirm and store a new password.
    NewPassword,
    /// Run the three timed door phases.
    DoorCycle,
    /// Report a mismatch; `lockout` adds the alarm.
    Rejection { attempts: u8, lockout: bool },
}

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Steps taken since the current state was entered.
    pub steps_in_state: u64,
    /// Monotonic total step count.
    pub total_steps: u64,

    // -- Inputs written back by the service --
    pub decision: Option<Decision>,
    pub verdict: Option<Verdict>,
    /// Set once the posted request has been carried out.
    pub request_done: bool,

    // -- Outputs --
    pub request: Request,

    // -- Policy --
    pub attempts: AttemptCounter,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            steps_in_state: 0,
            total_steps: 0,
            decision: None,
            verdict: None,
            request_done: false,
            request: Request::Idle,
            attempts: AttemptCounter::new(config.max_attempts),
            config,
        }
    }

    /// Post a request and clear the previous outcome flag.
    pub fn post(&mut self, request: Request) {
        self.request = request;
        self.request_done = false;
    }
}
