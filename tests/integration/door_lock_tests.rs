//! Two-ECU door lock over the in-memory link.
//!
//! The control ECU runs on its own thread, the interface ECU on the test
//! thread with a scripted keypad.  Both use the immediate timer and zero
//! display delays, so a whole session takes milliseconds.  A session ends
//! when the keypad runs dry: the interface ECU is dropped, which hangs up
//! the link and stops the control ECU.

use std::thread;

use avrlabs::adapters::console::{ScriptedKeypad, StdDelay};
use avrlabs::adapters::link::{LinkEnd, link_pair};
use avrlabs::app::events::AppEvent;
use avrlabs::app::ports::{InputError, LinkError, RolePort};
use avrlabs::app::service::AccessService;
use avrlabs::config::SystemConfig;
use avrlabs::drivers::hw_timer::ImmediateTimer;
use avrlabs::error::Error;
use avrlabs::fsm::StateId;
use avrlabs::lock::control::ControlEcu;
use avrlabs::lock::hmi::InterfaceEcu;
use avrlabs::lock::password::Verdict;
use avrlabs::lock::protocol::{BootStatus, Decision, READY};
use avrlabs::lock::timed::DoorPhase;

use super::mock_hw::{
    ActuatorCall, LogSink, MockDoorHardware, MockEeprom, ScreenLog, ScriptedLink, showed_in_order,
};

type Control = ControlEcu<LinkEnd, MockEeprom, MockDoorHardware, ImmediateTimer>;

/// Everything a finished session leaves behind.
struct Session {
    control: Control,
    control_events: LogSink,
    control_stop: Error,
    hmi_events: LogSink,
    hmi_stop: Error,
    hmi_screen: Vec<String>,
    /// Every string the interface ECU wrote, in order.
    hmi_shown: Vec<String>,
    hmi_state: StateId,
}

/// Start, then run cycles until an error ends the role.
fn drive(svc: &mut AccessService, role: &mut impl RolePort, sink: &mut LogSink) -> Error {
    if let Err(e) = svc.start(role, sink) {
        return e;
    }
    loop {
        if let Err(e) = svc.run_cycle(role, sink) {
            return e;
        }
    }
}

fn run_session(keys: &str, store: MockEeprom) -> Session {
    let config = SystemConfig::instant();
    // The timeout only guards against a hung test.
    let (hmi_link, control_link) = link_pair(Some(5_000));

    let control_cfg = config.clone();
    let control = thread::spawn(move || {
        let mut ecu = ControlEcu::new(
            control_link,
            store,
            MockDoorHardware::new(),
            ImmediateTimer::new(),
        );
        let mut svc = AccessService::new(control_cfg);
        let mut sink = LogSink::new();
        let stop = drive(&mut svc, &mut ecu, &mut sink);
        (ecu, sink, stop)
    });

    let (hmi_events, hmi_stop, hmi_screen, hmi_shown, hmi_state) = {
        let mut ecu = InterfaceEcu::new(
            hmi_link,
            ScriptedKeypad::from_legends(keys),
            ScreenLog::new(),
            ImmediateTimer::new(),
            NoDelay,
            config.clone(),
        );
        let mut svc = AccessService::new(config);
        let mut sink = LogSink::new();
        let stop = drive(&mut svc, &mut ecu, &mut sink);
        let screen = ecu.display().lcd.rows().map(str::to_string).collect();
        let shown = ecu.display().shown.clone();
        (sink, stop, screen, shown, svc.state())
    };

    let (control, control_events, control_stop) = control.join().unwrap();
    Session {
        control,
        control_events,
        control_stop,
        hmi_events,
        hmi_stop,
        hmi_screen,
        hmi_shown,
        hmi_state,
    }
}

struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn door_calls() -> Vec<ActuatorCall> {
    use ActuatorCall::*;
    vec![Forward, Stop, Stop, Stop, Reverse, Stop]
}

// ── Bootstrap ─────────────────────────────────────────────────

#[test]
fn first_login_sets_password_once_then_opens_door() {
    let s = run_session("12345=12345= -12345=", MockEeprom::erased());

    assert_eq!(s.control.store().password(), [1, 2, 3, 4, 5]);
    assert_eq!(s.control.store().writes.len(), 5);
    assert_eq!(
        s.control_events.events.first(),
        Some(&AppEvent::PasswordChanged)
    );
    assert!(
        s.control_events
            .events
            .contains(&AppEvent::Started(BootStatus::FirstTimeLogin))
    );
    assert!(
        s.hmi_events
            .events
            .contains(&AppEvent::Started(BootStatus::FirstTimeLogin))
    );
    assert_eq!(s.control.hardware().calls, door_calls());

    assert_eq!(s.hmi_stop, Error::Input(InputError::Exhausted));
    assert_eq!(s.control_stop, Error::Link(LinkError::Closed));
}

#[test]
fn stored_password_skips_bootstrap() {
    let s = run_session("-12345=", MockEeprom::with_password([1, 2, 3, 4, 5]));

    assert!(
        s.control_events
            .events
            .contains(&AppEvent::Started(BootStatus::AnyTimeLogin))
    );
    assert_eq!(s.control_events.count(|e| *e == AppEvent::PasswordChanged), 0);
    assert!(s.control.store().writes.is_empty());
    assert_eq!(s.control.hardware().calls, door_calls());
}

#[test]
fn unmatched_confirmation_asks_again() {
    let s = run_session("12345=54321= 11111=11111=", MockEeprom::erased());

    assert_eq!(s.control.store().password(), [1, 1, 1, 1, 1]);
    assert_eq!(s.control.store().writes.len(), 5);
    assert!(showed_in_order(
        &s.hmi_shown,
        &[
            "FIRST TIME TO LOGIN",
            "ENTER NEW PASSWORD",
            "RE-ENTER PASSWORD",
            "PASSWORD UNMATCHED",
            "TRY AGAIN",
            "ENTER NEW PASSWORD",
            "PASSWORD CHANGED",
        ]
    ));
}

// ── Open door ─────────────────────────────────────────────────

#[test]
fn door_phases_run_in_order_on_both_ecus() {
    let s = run_session("-12345=", MockEeprom::with_password([1, 2, 3, 4, 5]));

    let phases = |sink: &LogSink| -> Vec<DoorPhase> {
        sink.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::DoorPhaseDone(p) => Some(*p),
                _ => None,
            })
            .collect()
    };
    assert_eq!(phases(&s.control_events), DoorPhase::SEQUENCE.to_vec());
    assert_eq!(phases(&s.hmi_events), DoorPhase::SEQUENCE.to_vec());
    assert_eq!(s.control.clock().ticks(), 0);
    assert_eq!(s.hmi_state, StateId::AwaitingDecision);
    assert_eq!(s.hmi_screen[0], "+ : CHANGE PASSWORD");
    assert_eq!(s.hmi_screen[1], "- : OPEN DOOR");
    assert!(showed_in_order(
        &s.hmi_shown,
        &[
            "ENTER CURRENT PASSWORD",
            "DOOR IS OPENING",
            "DOOR OPEN",
            "DOOR IS CLOSING",
            "DOOR CLOSED",
            "+ : CHANGE PASSWORD",
        ]
    ));
}

#[test]
fn star_restarts_entry() {
    let s = run_session("-12*12345=", MockEeprom::with_password([1, 2, 3, 4, 5]));
    assert!(
        s.control_events
            .events
            .contains(&AppEvent::VerdictReached(Verdict::Matched))
    );
    assert_eq!(s.control.hardware().calls, door_calls());
}

#[test]
fn equals_before_five_digits_is_ignored() {
    let s = run_session("-123=45=", MockEeprom::with_password([1, 2, 3, 4, 5]));
    assert_eq!(s.control.hardware().calls, door_calls());
}

// ── Change password ───────────────────────────────────────────

#[test]
fn change_password_then_open_with_new_one() {
    let s = run_session(
        "+12345=99999=99999= -99999=",
        MockEeprom::with_password([1, 2, 3, 4, 5]),
    );

    assert_eq!(s.control.store().password(), [9, 9, 9, 9, 9]);
    assert_eq!(s.control_events.count(|e| *e == AppEvent::PasswordChanged), 1);
    assert_eq!(s.control.hardware().calls, door_calls());
}

// ── Wrong password / lockout ──────────────────────────────────

#[test]
fn two_misses_then_match_keeps_retrying() {
    let s = run_session(
        "-11111=22222=12345=",
        MockEeprom::with_password([1, 2, 3, 4, 5]),
    );

    assert_eq!(
        s.control_events
            .count(|e| matches!(e, AppEvent::AttemptFailed { .. })),
        2
    );
    assert_eq!(s.control_events.count(|e| *e == AppEvent::AlarmRaised), 0);
    assert_eq!(s.control.hardware().calls, door_calls());
    assert!(showed_in_order(
        &s.hmi_shown,
        &[
            "INCORRECT PASSWORD",
            "ENTER PASSWORD AGAIN",
            "INCORRECT PASSWORD",
            "AFTER 1 MORE FAILED ATTEMPT",
            "SYSTEM WILL BE LOCKED",
            "DOOR IS OPENING",
        ]
    ));
    assert!(!s.hmi_shown.iter().any(|t| t == "SYSTEM IS LOCKED"));
}

#[test]
fn three_misses_raise_alarm_exactly_once() {
    let s = run_session(
        "-12345=12345=12345=",
        MockEeprom::with_password([1, 2, 3, 4, 6]),
    );

    let failures: Vec<_> = s
        .control_events
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AttemptFailed {
                attempts,
                max_attempts,
            } => Some((*attempts, *max_attempts)),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(s.control_events.count(|e| *e == AppEvent::AlarmRaised), 1);
    assert_eq!(s.hmi_events.count(|e| *e == AppEvent::AlarmRaised), 1);
    assert_eq!(
        s.control.hardware().calls,
        vec![ActuatorCall::AlarmOn, ActuatorCall::AlarmOff]
    );
    assert_eq!(s.hmi_state, StateId::AwaitingDecision);
    assert!(showed_in_order(
        &s.hmi_shown,
        &[
            "INCORRECT PASSWORD",
            "ENTER PASSWORD AGAIN",
            "INCORRECT PASSWORD",
            "SYSTEM WILL BE LOCKED",
            "INCORRECT PASSWORD",
            "MAXIMUM NUMBER OF",
            "ATTEMPTS EXCEEDED",
            "SYSTEM IS LOCKED",
            "+ : CHANGE PASSWORD",
        ]
    ));
    assert!(!s.hmi_shown.iter().any(|t| t == "DOOR IS OPENING"));
}

#[test]
fn lockout_resets_counter_for_next_cycle() {
    let s = run_session(
        "-11111=11111=11111= -11111=12345=",
        MockEeprom::with_password([1, 2, 3, 4, 5]),
    );

    assert_eq!(s.control_events.count(|e| *e == AppEvent::AlarmRaised), 1);
    assert!(s.control_events.events.contains(&AppEvent::AttemptFailed {
        attempts: 1,
        max_attempts: 3
    }));
    // One failure in the second cycle, counted from zero again.
    assert_eq!(
        s.control_events.count(|e| *e
            == AppEvent::AttemptFailed {
                attempts: 1,
                max_attempts: 3
            }),
        2
    );
    assert_eq!(s.control.hardware().count(ActuatorCall::Forward), 1);
}

// ── Link failure ──────────────────────────────────────────────

#[test]
fn silent_peer_times_out_when_configured() {
    let (_hmi_link, control_link) = link_pair(Some(20));
    let mut ecu = ControlEcu::new(
        control_link,
        MockEeprom::erased(),
        MockDoorHardware::new(),
        ImmediateTimer::new(),
    );
    let mut svc = AccessService::new(SystemConfig::instant());
    let mut sink = LogSink::new();

    assert_eq!(
        svc.start(&mut ecu, &mut sink),
        Err(Error::Link(LinkError::Timeout))
    );
    assert!(sink.events.is_empty());
}

#[test]
fn controller_ignores_unknown_decision_byte() {
    // READY for the boot status, a stray '*', then '-', the five digits,
    // and READY for the verdict.
    let inbound = [READY, b'*', b'-', 1, 2, 3, 4, 5, READY];
    let mut ecu = ControlEcu::new(
        ScriptedLink::new(&inbound),
        MockEeprom::with_password([1, 2, 3, 4, 5]),
        MockDoorHardware::new(),
        ImmediateTimer::new(),
    );
    let mut svc = AccessService::new(SystemConfig::instant());
    let mut sink = LogSink::new();

    assert_eq!(drive(&mut svc, &mut ecu, &mut sink), Error::Link(LinkError::Closed));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DecisionMade(_))), 1);
    assert!(sink.events.contains(&AppEvent::DecisionMade(Decision::OpenDoor)));
    assert_eq!(ecu.hardware().calls, door_calls());
    // Status, a READY each for '*' and '-', five digit READYs, the
    // verdict, then the READY for the next decision.
    let mut expected = vec![0, READY, READY];
    expected.extend([READY; 5]);
    expected.extend([Verdict::Matched.to_byte(), READY]);
    assert_eq!(ecu.link().sent, expected);
}

/// Like [`drive`], but treats a receive timeout as "try again".
fn drive_through_timeouts(
    svc: &mut AccessService,
    role: &mut impl RolePort,
    sink: &mut LogSink,
) -> (Error, u32) {
    let mut timeouts = 0;
    loop {
        match svc.start(role, sink) {
            Ok(_) => break,
            Err(Error::Link(LinkError::Timeout)) => timeouts += 1,
            Err(e) => return (e, timeouts),
        }
    }
    loop {
        match svc.step(role, sink) {
            Ok(()) => {}
            Err(Error::Link(LinkError::Timeout)) => timeouts += 1,
            Err(e) => return (e, timeouts),
        }
    }
}

#[test]
fn controller_keeps_in_step_after_timeouts_during_slow_typing() {
    let (hmi_link, control_link) = link_pair(Some(25));
    let hmi_link = hmi_link.with_timeout(None);

    let control = thread::spawn(move || {
        let mut ecu = ControlEcu::new(
            control_link,
            MockEeprom::with_password([1, 2, 3, 4, 5]),
            MockDoorHardware::new(),
            ImmediateTimer::new(),
        );
        let mut svc = AccessService::new(SystemConfig::instant());
        let mut sink = LogSink::new();
        let (stop, timeouts) = drive_through_timeouts(&mut svc, &mut ecu, &mut sink);
        (ecu, sink, stop, timeouts)
    });

    let hmi_events = {
        // Each key press holds for three link timeouts.
        let config = SystemConfig {
            key_press_delay_ms: 75,
            ..SystemConfig::instant()
        };
        let mut ecu = InterfaceEcu::new(
            hmi_link,
            ScriptedKeypad::from_legends("-12345="),
            ScreenLog::new(),
            ImmediateTimer::new(),
            StdDelay,
            config.clone(),
        );
        let mut svc = AccessService::new(config);
        let mut sink = LogSink::new();
        assert_eq!(
            drive(&mut svc, &mut ecu, &mut sink),
            Error::Input(InputError::Exhausted)
        );
        sink
    };

    let (ecu, control_events, control_stop, timeouts) = control.join().unwrap();
    assert!(timeouts > 0);
    assert_eq!(control_stop, Error::Link(LinkError::Closed));
    assert!(
        hmi_events
            .events
            .contains(&AppEvent::VerdictReached(Verdict::Matched))
    );
    assert!(
        control_events
            .events
            .contains(&AppEvent::VerdictReached(Verdict::Matched))
    );
    assert_eq!(ecu.hardware().calls, door_calls());
}
