//! The single-board labs wired to the host adapters.

use std::sync::Arc;

use avrlabs::adapters::console::{ScriptedKeypad, TextDisplay};
use avrlabs::adapters::eeprom::EepromAdapter;
use avrlabs::adapters::gpio::{SimPin, SimPwm};
use avrlabs::app::ports::{ConfigPort, TimerPort};
use avrlabs::calculator::Calculator;
use avrlabs::config::SystemConfig;
use avrlabs::control::speed::{Rotation, SpeedController};
use avrlabs::drivers::fan_motor::FanMotor;
use avrlabs::drivers::hw_timer::{ImmediateTimer, ThreadTimer};
use avrlabs::error::{CalcError, DutyCycleError, Error};
use avrlabs::events::{Event, event_queue};
use avrlabs::power::{ButtonPresser, SleepCounter, WakeSource};
use avrlabs::sensors::duty_cycle::{duty_cycle, measure};
use avrlabs::sensors::square_wave::SquareWave;
use avrlabs::sensors::temperature::{SimAdc, TemperatureSensor};
use avrlabs::stopwatch::{Stopwatch, StopwatchInputs};

struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── Duty cycle ────────────────────────────────────────────────

#[test]
fn duty_cycle_of_simulated_wave() {
    let mut wave = SquareWave::new(100, 1000);
    let capture = wave.capture();
    assert_eq!(measure(&mut wave, capture).unwrap(), 9);
}

#[test]
fn duty_cycle_zero_divisor_is_an_error_not_a_crash() {
    let e: Error = duty_cycle(300, 300, 300).unwrap_err().into();
    assert_eq!(e, Error::Measurement(DutyCycleError::ZeroDivisor));
}

// ── Motor speed ───────────────────────────────────────────────

#[test]
fn temperature_bands_drive_pwm() {
    let adc = SimAdc::new(0);
    let mut sensor = TemperatureSensor::new(adc.clone(), 0);
    let pwm = SimPwm::new();
    let (in1, in2) = (SimPin::new("PB0"), SimPin::new("PB1"));
    let motor = FanMotor::new(pwm.clone(), in1.clone(), in2.clone()).unwrap();
    let mut speed = SpeedController::new(motor, SystemConfig::default());

    let mut seen = Vec::new();
    for raw in [0u16, 200, 256, 257, 700, 1000, 0] {
        adc.set(raw);
        let reading = sensor.read().unwrap();
        speed.update(reading.raw).unwrap();
        seen.push(pwm.duty());
    }
    assert_eq!(seen, vec![0, 64, 64, 128, 192, 255, 255]);

    assert!(in1.is_high() && !in2.is_high());
    assert_eq!(speed.reverse().unwrap(), Rotation::Anticlockwise);
    assert!(!in1.is_high() && in2.is_high());
}

#[test]
fn reverse_button_arrives_through_event_queue() {
    let (mut buttons, mut events) = event_queue();
    let motor = FanMotor::new(SimPwm::new(), SimPin::new("PB0"), SimPin::new("PB1")).unwrap();
    let mut speed = SpeedController::new(motor, SystemConfig::default());

    buttons.push(Event::ReversePressed);
    buttons.push(Event::ReversePressed);
    buttons.push(Event::ReversePressed);
    events.drain(|e| {
        if e == Event::ReversePressed {
            speed.reverse().unwrap();
        }
    });
    assert_eq!(speed.motor().rotation(), Rotation::Anticlockwise);
}

// ── Stopwatch ─────────────────────────────────────────────────

#[test]
fn stopwatch_runs_off_the_thread_timer() {
    let (tx, mut rx) = event_queue();
    let inputs = StopwatchInputs::new(tx, 5).press_at(2, Event::ResetPressed);
    {
        let mut timer = ThreadTimer::new("timer1", 1);
        timer.arm(Box::new(inputs)).unwrap();
        // Drop waits for the handler to disarm.
    }
    let mut watch = Stopwatch::new();
    rx.drain(|e| {
        watch.handle(e);
    });
    assert_eq!(watch.time(), (0, 0, 3));
    assert_eq!(watch.digits(), [0, 0, 0, 0, 0, 3]);
}

#[test]
fn stopwatch_full_hour_rolls_over() {
    use avrlabs::app::ports::{TickControl, TickHandler};

    let (tx, mut rx) = event_queue();
    let mut inputs = StopwatchInputs::new(tx, 3600);
    let mut watch = Stopwatch::new();
    // Drain every tick; the queue holds far fewer than an hour of events.
    let mut ticks = 0;
    loop {
        ticks += 1;
        let control = inputs.on_tick();
        rx.drain(|e| {
            watch.handle(e);
        });
        if control == TickControl::Disarm {
            break;
        }
    }
    assert_eq!(ticks, 3600);
    assert_eq!(watch.to_string(), "01:00:00");
}

#[test]
fn stopwatch_short_run_on_immediate_timer() {
    let (tx, mut rx) = event_queue();
    let mut timer = ImmediateTimer::new();
    timer
        .arm(Box::new(
            StopwatchInputs::new(tx, 8).press_at(4, Event::PausePressed),
        ))
        .unwrap();
    assert_eq!(timer.ticks_delivered(), 8);

    let mut watch = Stopwatch::new();
    rx.drain(|e| {
        watch.handle(e);
    });
    assert!(watch.is_paused());
    assert_eq!(watch.time(), (0, 0, 4));
}

// ── Calculator ────────────────────────────────────────────────

#[test]
fn calculator_session_from_keypad() {
    let mut calc = Calculator::new(TextDisplay::new("calc"));
    let mut keypad = ScriptedKeypad::from_legends("12*34= 5/0= 9-4=");
    let results = calc.run(&mut keypad);
    assert_eq!(
        results,
        vec![
            Ok(408.0),
            Err(Error::Calc(CalcError::DivisionByZero)),
            Ok(5.0)
        ]
    );
    assert_eq!(calc.display().row(2), "9-4=5.00");
    assert_eq!(calc.display().row(1), "Enter operation:");
}

// ── Sleep mode ────────────────────────────────────────────────

#[test]
fn sleep_counter_counts_every_press() {
    let source = Arc::new(WakeSource::new(SimPin::new("PB1")));
    let mut counter = SleepCounter::new(
        Arc::clone(&source),
        TextDisplay::new("sleep"),
        &mut NoDelay,
    );
    let mut button = ThreadTimer::new("int2", 1);
    button
        .arm(Box::new(ButtonPresser::new(Arc::clone(&source), 3)))
        .unwrap();
    assert_eq!(counter.run_until(3).unwrap(), 3);
    drop(button);

    assert_eq!(counter.display().row(0), "NUMBER OF PRESS:3");
    assert_eq!(source.presses(), 3);
}

// ── Config in EEPROM ──────────────────────────────────────────

#[test]
fn config_block_persists_beside_password() {
    use avrlabs::app::ports::StoragePort;
    use avrlabs::lock::password::{Password, is_first_login};

    let mut eeprom = EepromAdapter::new();
    assert!(is_first_login(&eeprom).unwrap());
    Password::new([4, 4, 4, 4, 4]).unwrap().save(&mut eeprom).unwrap();

    let mut cfg = SystemConfig::default();
    cfg.link_timeout_ms = Some(1500);
    eeprom.save(&cfg).unwrap();

    assert!(!is_first_login(&eeprom).unwrap());
    assert_eq!(Password::load(&eeprom).unwrap(), [4, 4, 4, 4, 4]);
    assert_eq!(eeprom.load().unwrap(), cfg);
    assert_eq!(eeprom.capacity(), 1024);
}
