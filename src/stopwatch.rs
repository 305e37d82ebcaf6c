//! Six-digit `HH MM SS` stopwatch.
//!
//! Timer1 fires once per second and three push buttons (INT0 reset,
//! INT1 pause, INT2 resume) control it.  Both sources only push
//! [`Event`]s; the main loop owns the [`Stopwatch`] and applies them.

use std::collections::VecDeque;

use log::{debug, info};

use crate::app::ports::{TickControl, TickHandler};
use crate::events::{Event, EventProducer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stopwatch {
    hours: u8,
    minutes: u8,
    seconds: u8,
    paused: bool,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            paused: false,
        }
    }

    /// Advance one second unless paused.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.seconds += 1;
        if self.seconds == 60 {
            self.seconds = 0;
            self.minutes += 1;
            if self.minutes == 60 {
                self.minutes = 0;
                self.hours += 1;
                if self.hours > 23 {
                    self.hours = 0;
                }
            }
        }
    }

    /// Zero the time; a running watch keeps running.
    pub fn reset(&mut self) {
        self.hours = 0;
        self.minutes = 0;
        self.seconds = 0;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Apply one queued event. Returns `true` if the event belonged to
    /// the stopwatch.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::SecondElapsed => self.tick(),
            Event::ResetPressed => self.reset(),
            Event::PausePressed => self.pause(),
            Event::ResumePressed => self.resume(),
            Event::ReversePressed => return false,
        }
        debug!("stopwatch: {:?} -> {}", event, self);
        true
    }

    pub fn time(&self) -> (u8, u8, u8) {
        (self.hours, self.minutes, self.seconds)
    }

    /// Digits in display order, tens first.
    pub fn digits(&self) -> [u8; 6] {
        [
            self.hours / 10,
            self.hours % 10,
            self.minutes / 10,
            self.minutes % 10,
            self.seconds / 10,
            self.seconds % 10,
        ]
    }

    #[cfg(test)]
    fn at(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            paused: false,
        }
    }
}

impl core::fmt::Display for Stopwatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

// ── Interrupt side ──────────────────────────────────────────────

/// Timer handler that pushes `SecondElapsed` each tick and replays
/// button presses scheduled at given second offsets.
///
/// Disarms after `duration` ticks.
pub struct StopwatchInputs {
    events: EventProducer,
    presses: VecDeque<(u32, Event)>,
    elapsed: u32,
    duration: u32,
}

impl StopwatchInputs {
    pub fn new(events: EventProducer, duration: u32) -> Self {
        Self {
            events,
            presses: VecDeque::new(),
            elapsed: 0,
            duration,
        }
    }

    /// Schedule a button press right after second `at`.
    pub fn press_at(mut self, at: u32, event: Event) -> Self {
        let pos = self.presses.iter().position(|(t, _)| *t > at).unwrap_or(self.presses.len());
        self.presses.insert(pos, (at, event));
        self
    }
}

impl TickHandler for StopwatchInputs {
    fn on_tick(&mut self) -> TickControl {
        self.elapsed += 1;
        self.events.push(Event::SecondElapsed);
        while let Some(&(at, event)) = self.presses.front() {
            if at > self.elapsed {
                break;
            }
            info!("stopwatch: button {:?} at {}s", event, self.elapsed);
            self.events.push(event);
            self.presses.pop_front();
        }
        if self.elapsed >= self.duration {
            TickControl::Disarm
        } else {
            TickControl::Continue
        }
    }
}
