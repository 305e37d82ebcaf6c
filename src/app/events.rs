//! Outbound application events.
//!
//! The [`AccessService`](super::service::AccessService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, record in a test, etc.

use crate::fsm::StateId;
use crate::lock::password::Verdict;
use crate::lock::protocol::{BootStatus, Decision};
use crate::lock::timed::DoorPhase;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has booted (carries the exchanged boot status).
    Started(BootStatus),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The user picked an action.
    DecisionMade(Decision),

    /// A candidate password was judged.
    VerdictReached(Verdict),

    /// A mismatch was counted against the current cycle.
    AttemptFailed { attempts: u8, max_attempts: u8 },

    /// The stored password was replaced.
    PasswordChanged,

    /// One timed door phase completed.
    DoorPhaseDone(DoorPhase),

    /// Attempts exhausted: alarm started.
    AlarmRaised,

    /// Alarm period elapsed.
    AlarmCleared,
}
