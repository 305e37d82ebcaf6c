//! State handlers and the table that binds them to [`StateId`]s.
//!
//! Handlers are plain `fn` pointers that capture nothing.  They read
//! outcomes from the context and post the next [`Request`].
//!
//! ```text
//!  AWAITING_DECISION ──[decision]──▶ AWAITING_CURRENT_PASSWORD ◀──┐
//!        ▲                              │            │            │
//!        │                         [matched]    [mismatched]  [retry]
//!        │                              ▼            ▼            │
//!        ├──[action done]──── PASSWORD_ACCEPTED   PASSWORD_REJECTED
//!        │                                           │
//!        └──────────────────[alarm done]─────────────┘
//! ```

use super::context::{FsmContext, Request};
use super::{StateDescriptor, StateId};
use crate::lock::password::Verdict;
use crate::lock::protocol::Decision;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: AwaitingDecision
        StateDescriptor {
            id: StateId::AwaitingDecision,
            name: "AwaitingDecision",
            on_enter: Some(decision_enter),
            on_exit: None,
            on_update: decision_update,
        },
        // Index 1: AwaitingCurrentPassword
        StateDescriptor {
            id: StateId::AwaitingCurrentPassword,
            name: "AwaitingCurrentPassword",
            on_enter: Some(password_enter),
            on_exit: None,
            on_update: password_update,
        },
        // Index 2: PasswordAccepted
        StateDescriptor {
            id: StateId::PasswordAccepted,
            name: "PasswordAccepted",
            on_enter: Some(accepted_enter),
            on_exit: None,
            on_update: accepted_update,
        },
        // Index 3: PasswordRejected
        StateDescriptor {
            id: StateId::PasswordRejected,
            name: "PasswordRejected",
            on_enter: Some(rejected_enter),
            on_exit: Some(rejected_exit),
            on_update: rejected_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_DECISION: start of every access cycle
// ═══════════════════════════════════════════════════════════════════════════

fn decision_enter(ctx: &mut FsmContext) {
    ctx.attempts.reset();
    ctx.decision = None;
    ctx.verdict = None;
    ctx.post(Request::Decision);
}

fn decision_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.decision.map(|_| StateId::AwaitingCurrentPassword)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_CURRENT_PASSWORD
// ═══════════════════════════════════════════════════════════════════════════

fn password_enter(ctx: &mut FsmContext) {
    ctx.verdict = None;
    ctx.post(Request::CurrentPassword);
}

fn password_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.verdict? {
        Verdict::Matched => Some(StateId::PasswordAccepted),
        Verdict::Mismatched => Some(StateId::PasswordRejected),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PASSWORD_ACCEPTED: run the decision-specific action
// ═══════════════════════════════════════════════════════════════════════════

fn accepted_enter(ctx: &mut FsmContext) {
    ctx.attempts.reset();
    match ctx.decision {
        Some(Decision::ChangePassword) => ctx.post(Request::NewPassword),
        Some(Decision::OpenDoor) => ctx.post(Request::DoorCycle),
        None => {
            warn!("ACCEPTED: no decision recorded, nothing to do");
            ctx.post(Request::Idle);
            ctx.request_done = true;
        }
    }
}

fn accepted_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.request_done.then_some(StateId::AwaitingDecision)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PASSWORD_REJECTED: count the failure, retry or lock out
// ═══════════════════════════════════════════════════════════════════════════

fn rejected_enter(ctx: &mut FsmContext) {
    let attempts = ctx.attempts.record_failure();
    let lockout = ctx.attempts.exhausted();
    if lockout {
        warn!(
            "REJECTED: {} of {} attempts used, locking out",
            attempts,
            ctx.attempts.limit()
        );
    } else {
        info!("REJECTED: attempt {} of {}", attempts, ctx.attempts.limit());
    }
    ctx.post(Request::Rejection { attempts, lockout });
}

fn rejected_exit(ctx: &mut FsmContext) {
    if ctx.attempts.exhausted() {
        ctx.attempts.reset();
    }
}

fn rejected_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.request_done {
        return None;
    }
    if ctx.attempts.exhausted() {
        Some(StateId::AwaitingDecision)
    } else {
        Some(StateId::AwaitingCurrentPassword)
    }
}
