//! AVR Labs simulator: Main Entry Point
//!
//! Runs one of the ATmega16 labs against simulated peripherals.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ScriptedKeypad   TextDisplay   EepromAdapter   LinkEnd        │
//! │  (KeypadPort)     (DisplayPort) (Storage+Config)(LinkPort)     │
//! │  DoorHardware     LogEventSink  ThreadTimer     SimPin/SimPwm  │
//! │  (Door+Alarm)     (EventSink)   (TimerPort)     (embedded-hal) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   AccessService ×2 (pure logic)                        │    │
//! │  │   FSM · AttemptCounter · Password                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Duty-cycle capture · Speed control · Stopwatch · Calculator   │
//! │  Sleep counter                                                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Run `avrlabs-sim --help` for the labs and flags; the door lock is the
//! default.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use avrlabs::adapters::console::{ScriptedKeypad, StdDelay, TextDisplay};
use avrlabs::adapters::eeprom::EepromAdapter;
use avrlabs::adapters::gpio::{SimPin, SimPwm};
use avrlabs::adapters::hardware::DoorHardware;
use avrlabs::adapters::link::link_pair;
use avrlabs::adapters::log_sink::LogEventSink;
use avrlabs::app::ports::{ConfigPort, DisplayPort, InputError, LinkError, RolePort, TimerPort};
use avrlabs::app::service::AccessService;
use avrlabs::calculator::Calculator;
use avrlabs::config::SystemConfig;
use avrlabs::control::speed::SpeedController;
use avrlabs::drivers::alarm::Alarm;
use avrlabs::drivers::door_motor::DoorMotor;
use avrlabs::drivers::fan_motor::FanMotor;
use avrlabs::drivers::hw_timer::ThreadTimer;
use avrlabs::error::Error;
use avrlabs::events::{Event, event_queue};
use avrlabs::lock::control::ControlEcu;
use avrlabs::lock::hmi::InterfaceEcu;
use avrlabs::power::{ButtonPresser, SleepCounter, WakeSource};
use avrlabs::sensors::duty_cycle::measure;
use avrlabs::sensors::square_wave::SquareWave;
use avrlabs::sensors::temperature::{SimAdc, TemperatureSensor};
use avrlabs::stopwatch::{Stopwatch, StopwatchInputs};

/// First login, open the door, change the password, then three wrong
/// entries to trip the alarm.
const DOOR_SCRIPT: &str = "12345= 12345= - 12345= + 12345= 54321= 54321= - 11111= 22222= 33333=";
const CALC_SCRIPT: &str = "12*34= 7/2= 5/0= C 3-10=";
const SPEED_READINGS: [u16; 8] = [0, 100, 300, 600, 900, 0, 450, 200];
const STOPWATCH_SECONDS: u32 = 75;
const SLEEP_PRESSES: u8 = 5;

/// Inner width of the start-up banner box.
const BANNER_WIDTH: usize = 38;

// ── Command line ──────────────────────────────────────────────

/// ATmega16 labs against simulated peripherals
#[derive(Parser, Debug)]
#[command(name = "avrlabs-sim")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Lab to run
    #[arg(value_enum, default_value_t = Lab::Door)]
    lab: Lab,

    /// Zero display holds and use a 1 ms tick
    #[arg(long)]
    fast: bool,

    /// File backing the simulated EEPROM (kept in memory when absent)
    #[arg(long, value_name = "PATH")]
    eeprom: Option<PathBuf>,

    /// Keypad script for the door lock or calculator, e.g. "-12345="
    #[arg(long)]
    keys: Option<String>,

    /// Print the effective config as JSON before running
    #[arg(long)]
    dump_config: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Lab {
    /// Two-ECU door lock
    Door,
    /// Duty cycle of a square wave
    Duty,
    /// Fan speed from temperature
    Speed,
    /// Six-digit stopwatch
    Stopwatch,
    /// Keypad calculator
    Calc,
    /// Sleep-mode press counter
    Sleep,
}

fn banner(version: &str) -> [String; 3] {
    let title = format!("  AVR Labs sim v{}", version);
    let rule = "═".repeat(BANNER_WIDTH);
    [
        format!("╔{}╗", rule),
        format!("║{:<width$}║", title, width = BANNER_WIDTH),
        format!("╚{}╝", rule),
    ]
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Cli::parse();

    for line in banner(env!("CARGO_PKG_VERSION")) {
        info!("{}", line);
    }

    // ── 2. Load config from EEPROM (or defaults) ──────────────
    let eeprom = match &opts.eeprom {
        Some(path) => EepromAdapter::with_file(path).map_err(Error::from)?,
        None => EepromAdapter::new(),
    };
    let mut config = eeprom.load().unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SystemConfig::default()
    });
    if opts.fast {
        config = SystemConfig {
            tick_period_ms: 1,
            key_press_delay_ms: 0,
            short_display_ms: 0,
            long_display_ms: 0,
            ..config
        };
    }
    info!(
        "Config: attempts={} alarm={}t run={}t hold={}t tick={}ms link_timeout={:?}",
        config.max_attempts,
        config.alarm_ticks,
        config.motor_run_ticks,
        config.motor_hold_ticks,
        config.tick_period_ms,
        config.link_timeout_ms,
    );
    if opts.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    // ── 3. Run the lab ────────────────────────────────────────
    match opts.lab {
        Lab::Door => run_door(config, eeprom, opts.keys.as_deref().unwrap_or(DOOR_SCRIPT)),
        Lab::Duty => run_duty(),
        Lab::Speed => run_speed(&config),
        Lab::Stopwatch => run_stopwatch(&config),
        Lab::Calc => run_calc(opts.keys.as_deref().unwrap_or(CALC_SCRIPT)),
        Lab::Sleep => run_sleep(&config),
    }
}

// ── Door lock ─────────────────────────────────────────────────

/// Boot one role and run access cycles until something stops it.
fn drive(
    svc: &mut AccessService,
    role: &mut impl RolePort,
    sink: &mut LogEventSink,
) -> avrlabs::error::Result<()> {
    svc.start(role, sink)?;
    loop {
        svc.run_cycle(role, sink)?;
    }
}

/// Drive one role until its input or its link runs out.
fn serve(svc: &mut AccessService, role: &mut impl RolePort, sink: &mut LogEventSink) -> Result<u64> {
    match drive(svc, role, sink) {
        Err(Error::Input(InputError::Exhausted)) => {
            info!("{}: keypad script finished", role.name());
            Ok(svc.cycles())
        }
        Err(Error::Link(LinkError::Closed)) => {
            info!("{}: peer hung up", role.name());
            Ok(svc.cycles())
        }
        Err(e) => Err(anyhow!(e).context(format!("{} ECU stopped", role.name()))),
        Ok(()) => Ok(svc.cycles()),
    }
}

fn run_door(config: SystemConfig, eeprom: EepromAdapter, keys: &str) -> Result<()> {
    let (hmi_link, control_link) = link_pair(config.link_timeout_ms);

    let control_cfg = config.clone();
    let control = thread::Builder::new()
        .name("control-ecu".into())
        .spawn(move || -> Result<u64> {
            let motor = DoorMotor::new(SimPin::new("PD6"), SimPin::new("PD7")).map_err(Error::from)?;
            let alarm = Alarm::new(SimPin::new("PA0"), SimPin::new("PA5")).map_err(Error::from)?;
            let timer = ThreadTimer::new("control", control_cfg.tick_period_ms);
            let mut ecu = ControlEcu::new(control_link, eeprom, DoorHardware::new(motor, alarm), timer);
            let mut svc = AccessService::new(control_cfg);
            serve(&mut svc, &mut ecu, &mut LogEventSink::new("control"))
        })?;

    let hmi_cycles = {
        let mut ecu = InterfaceEcu::new(
            hmi_link,
            ScriptedKeypad::from_legends(keys),
            TextDisplay::new("hmi").echoing(),
            ThreadTimer::new("hmi", config.tick_period_ms),
            StdDelay,
            config.clone(),
        );
        let mut svc = AccessService::new(config);
        serve(&mut svc, &mut ecu, &mut LogEventSink::new("hmi"))?
        // Dropping the HMI here hangs up the link.
    };

    let control_cycles = control
        .join()
        .map_err(|_| anyhow!("control ECU thread panicked"))??;
    info!("Door lab done: hmi cycles={} control cycles={}", hmi_cycles, control_cycles);
    Ok(())
}

// ── Duty cycle ────────────────────────────────────────────────

fn run_duty() -> Result<()> {
    for (high, low) in [(100u16, 1000u16), (250, 750), (500, 500), (900, 100)] {
        let mut wave = SquareWave::new(high, low);
        let capture = wave.capture();
        let duty = measure(&mut wave, capture)?;
        let mut lcd = TextDisplay::new("duty").echoing();
        lcd.show_at(0, 0, &format!("Duty = {}%", duty));
    }
    Ok(())
}

// ── Motor speed ───────────────────────────────────────────────

fn run_speed(config: &SystemConfig) -> Result<()> {
    let adc = SimAdc::new(0);
    let mut sensor = TemperatureSensor::new(adc.clone(), 0);
    let pwm = SimPwm::new();
    let motor = FanMotor::new(pwm.clone(), SimPin::new("PB0"), SimPin::new("PB1")).map_err(Error::from)?;
    let mut speed = SpeedController::new(motor, config.clone());
    let mut lcd = TextDisplay::new("speed").echoing();
    lcd.show_at(0, 0, "ADC Value = ");

    let (mut buttons, mut events) = event_queue();
    let mut delay = StdDelay;
    for (i, raw) in SPEED_READINGS.into_iter().enumerate() {
        adc.set(raw);
        if i == SPEED_READINGS.len() / 2 {
            buttons.push(Event::ReversePressed);
        }
        while let Some(event) = events.pop() {
            if event == Event::ReversePressed {
                speed.reverse().map_err(Error::from)?;
            }
        }
        let reading = sensor.read().map_err(Error::from)?;
        let duty = speed.update(reading.raw).map_err(Error::from)?;
        lcd.show_at(0, 12, &format!("{:<4}", reading.raw));
        info!(
            "ADC={} (~{} C) duty={} OCR0={} rotation={:?}",
            reading.raw,
            reading.celsius,
            duty,
            pwm.duty(),
            speed.motor().rotation()
        );
        delay.delay_ms(config.tick_period_ms);
    }
    Ok(())
}

// ── Stopwatch ─────────────────────────────────────────────────

fn run_stopwatch(config: &SystemConfig) -> Result<()> {
    let (tx, mut rx) = event_queue();
    let inputs = StopwatchInputs::new(tx, STOPWATCH_SECONDS)
        .press_at(10, Event::PausePressed)
        .press_at(15, Event::ResumePressed)
        .press_at(30, Event::ResetPressed);
    let mut timer = ThreadTimer::new("timer1", config.tick_period_ms);
    timer.arm(Box::new(inputs)).map_err(Error::from)?;

    let mut watch = Stopwatch::new();
    let mut lcd = TextDisplay::new("7seg").echoing();
    let mut seconds = 0;
    let mut delay = StdDelay;
    while seconds < STOPWATCH_SECONDS {
        while let Some(event) = rx.pop() {
            if event == Event::SecondElapsed {
                seconds += 1;
            }
            watch.handle(event);
            lcd.show_at(0, 0, &watch.to_string());
        }
        delay.delay_ms(1);
    }
    drop(timer);
    info!("Stopwatch lab done at {}", watch);
    Ok(())
}

// ── Calculator ────────────────────────────────────────────────

fn run_calc(keys: &str) -> Result<()> {
    let mut calc = Calculator::new(TextDisplay::new("calc").echoing());
    let mut keypad = ScriptedKeypad::from_legends(keys);
    for result in calc.run(&mut keypad) {
        match result {
            Ok(v) => info!("= {:.2}", v),
            Err(e) => warn!("{}", e),
        }
    }
    Ok(())
}

// ── Sleep mode ────────────────────────────────────────────────

fn run_sleep(config: &SystemConfig) -> Result<()> {
    let source = Arc::new(WakeSource::new(SimPin::new("PB1")));
    let mut counter = SleepCounter::new(Arc::clone(&source), TextDisplay::new("sleep").echoing(), &mut StdDelay);
    let mut button = ThreadTimer::new("int2", config.tick_period_ms);
    button
        .arm(Box::new(ButtonPresser::new(Arc::clone(&source), SLEEP_PRESSES)))
        .map_err(Error::from)?;
    let n = counter.run_until(SLEEP_PRESSES)?;
    info!("Sleep lab done after {} presses", n);
    Ok(())
}
