//! Password-session state machine shared by both lock ECUs.
//!
//! States are rows in a fixed table of plain `fn` pointers, looked up by
//! `StateId as usize`:
//!
//! ```text
//!   state                    enter   exit   update
//!   AwaitingDecision         yes     -      decision ready?
//!   AwaitingCurrentPassword  yes     -      verdict ready?
//!   PasswordAccepted         yes     -      request done?
//!   PasswordRejected         yes     yes    request done?
//! ```
//!
//! `step` polls the active row's update handler.  A returned `StateId`
//! moves the machine: the old row's exit hook fires, then the new row's
//! enter hook.  Hooks only see the [`FsmContext`], never the ports.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

/// Where a password session stands.  Discriminants index the table from
/// [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    AwaitingDecision = 0,
    AwaitingCurrentPassword = 1,
    PasswordAccepted = 2,
    PasswordRejected = 3,
}

impl StateId {
    /// Number of table rows.
    pub const COUNT: usize = 4;

    /// Row index to state.  Unknown rows trip a debug assertion and map
    /// to `AwaitingDecision` otherwise.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::AwaitingDecision,
            1 => Self::AwaitingCurrentPassword,
            2 => Self::PasswordAccepted,
            3 => Self::PasswordRejected,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::AwaitingDecision
            }
        }
    }
}

/// Enter or exit hook; fires once per transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Polled every step; `Some` names the state to move to.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

/// One table row.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    step_count: u64,
    /// `step_count` when `current` was entered.
    state_entry_step: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            step_count: 0,
            state_entry_step: 0,
        }
    }

    /// Fire the initial state's enter hook.  Call once, before `step`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        let first = &self.table[self.current];
        info!("session fsm entering {}", first.name);
        if let Some(hook) = first.on_enter {
            hook(ctx);
        }
    }

    /// Poll the active state once and follow any transition it asks for.
    pub fn step(&mut self, ctx: &mut FsmContext) {
        self.step_count += 1;
        ctx.total_steps = self.step_count;
        ctx.steps_in_state = self.steps_in_current_state();

        let update = self.table[self.current].on_update;
        if let Some(target) = update(ctx) {
            self.transition(target, ctx);
        }
    }

    /// Jump to `target` without polling.  No-op if already there.
    pub fn force_transition(&mut self, target: StateId, ctx: &mut FsmContext) {
        if self.current_state() != target {
            self.transition(target, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn steps_in_current_state(&self) -> u64 {
        self.step_count - self.state_entry_step
    }

    fn transition(&mut self, target: StateId, ctx: &mut FsmContext) {
        let from = &self.table[self.current];
        let to = &self.table[target as usize];
        info!("session fsm {} -> {}", from.name, to.name);

        if let Some(hook) = from.on_exit {
            hook(ctx);
        }
        self.current = to.id as usize;
        self.state_entry_step = self.step_count;
        ctx.steps_in_state = 0;
        if let Some(hook) = self.table[self.current].on_enter {
            hook(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::{FsmContext, Request};
    use super::*;
    use crate::config::SystemConfig;
    use crate::lock::password::Verdict;
    use crate::lock::protocol::Decision;

    fn started() -> (Fsm, FsmContext) {
        let mut fsm = Fsm::new(states::build_state_table(), StateId::AwaitingDecision);
        let mut ctx = FsmContext::new(SystemConfig::default());
        fsm.start(&mut ctx);
        (fsm, ctx)
    }

    /// Feed a decision and a verdict, ending in Accepted/Rejected.
    fn judge(fsm: &mut Fsm, ctx: &mut FsmContext, verdict: Verdict) {
        if fsm.current_state() == StateId::AwaitingDecision {
            ctx.decision = Some(Decision::OpenDoor);
            fsm.step(ctx);
        }
        ctx.verdict = Some(verdict);
        fsm.step(ctx);
    }

    fn finish_request(fsm: &mut Fsm, ctx: &mut FsmContext) {
        ctx.request_done = true;
        fsm.step(ctx);
    }

    #[test]
    fn start_posts_decision_request() {
        let (fsm, ctx) = started();
        assert_eq!(fsm.current_state(), StateId::AwaitingDecision);
        assert_eq!(ctx.request, Request::Decision);
    }

    #[test]
    fn waits_for_decision() {
        let (mut fsm, mut ctx) = started();
        for _ in 0..5 {
            fsm.step(&mut ctx);
        }
        assert_eq!(fsm.current_state(), StateId::AwaitingDecision);
        assert_eq!(fsm.steps_in_current_state(), 5);
    }

    #[test]
    fn decision_moves_to_password() {
        let (mut fsm, mut ctx) = started();
        ctx.decision = Some(Decision::ChangePassword);
        fsm.step(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::AwaitingCurrentPassword);
        assert_eq!(ctx.request, Request::CurrentPassword);
    }

    #[test]
    fn match_on_open_requests_door_cycle() {
        let (mut fsm, mut ctx) = started();
        judge(&mut fsm, &mut ctx, Verdict::Matched);
        assert_eq!(fsm.current_state(), StateId::PasswordAccepted);
        assert_eq!(ctx.request, Request::DoorCycle);
        assert_eq!(ctx.attempts.count(), 0);
    }

    #[test]
    fn match_on_change_requests_new_password() {
        let (mut fsm, mut ctx) = started();
        ctx.decision = Some(Decision::ChangePassword);
        fsm.step(&mut ctx);
        ctx.verdict = Some(Verdict::Matched);
        fsm.step(&mut ctx);
        assert_eq!(ctx.request, Request::NewPassword);
    }

    #[test]
    fn accepted_returns_to_decision_after_action() {
        let (mut fsm, mut ctx) = started();
        judge(&mut fsm, &mut ctx, Verdict::Matched);
        fsm.step(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::PasswordAccepted);
        finish_request(&mut fsm, &mut ctx);
        assert_eq!(fsm.current_state(), StateId::AwaitingDecision);
    }

    #[test]
    fn two_mismatches_retry() {
        let (mut fsm, mut ctx) = started();
        for expected in 1..=2u8 {
            judge(&mut fsm, &mut ctx, Verdict::Mismatched);
            assert_eq!(fsm.current_state(), StateId::PasswordRejected);
            assert_eq!(
                ctx.request,
                Request::Rejection {
                    attempts: expected,
                    lockout: false
                }
            );
            finish_request(&mut fsm, &mut ctx);
            assert_eq!(fsm.current_state(), StateId::AwaitingCurrentPassword);
        }
    }

    #[test]
    fn third_mismatch_locks_out_then_resets() {
        let (mut fsm, mut ctx) = started();
        for _ in 0..2 {
            judge(&mut fsm, &mut ctx, Verdict::Mismatched);
            finish_request(&mut fsm, &mut ctx);
        }
        judge(&mut fsm, &mut ctx, Verdict::Mismatched);
        assert_eq!(
            ctx.request,
            Request::Rejection {
                attempts: 3,
                lockout: true
            }
        );
        finish_request(&mut fsm, &mut ctx);
        assert_eq!(fsm.current_state(), StateId::AwaitingDecision);
        assert_eq!(ctx.attempts.count(), 0);
    }

    #[test]
    fn match_after_mismatch_resets_counter() {
        let (mut fsm, mut ctx) = started();
        judge(&mut fsm, &mut ctx, Verdict::Mismatched);
        finish_request(&mut fsm, &mut ctx);
        assert_eq!(ctx.attempts.count(), 1);
        judge(&mut fsm, &mut ctx, Verdict::Matched);
        assert_eq!(ctx.attempts.count(), 0);
    }

    #[test]
    fn rejection_waits_for_request_done() {
        let (mut fsm, mut ctx) = started();
        judge(&mut fsm, &mut ctx, Verdict::Mismatched);
        fsm.step(&mut ctx);
        fsm.step(&mut ctx);
        assert_eq!(fsm.current_state(), StateId::PasswordRejected);
    }

    #[test]
    fn force_transition_calls_enter() {
        let (mut fsm, mut ctx) = started();
        fsm.force_transition(StateId::PasswordRejected, &mut ctx);
        assert_eq!(ctx.attempts.count(), 1);
    }

    #[test]
    fn every_row_index_names_its_state() {
        for row in 0..StateId::COUNT {
            assert_eq!(StateId::from_index(row) as usize, row);
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn state_id_from_invalid_index_falls_back() {
        assert_eq!(StateId::from_index(99), StateId::AwaitingDecision);
    }
}
