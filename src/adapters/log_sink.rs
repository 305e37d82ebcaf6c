//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger, one `TAG | key=value` line per event.  Each ECU tags its
//! lines so the two interleaved streams stay readable.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink {
    ecu: &'static str,
}

impl LogEventSink {
    pub fn new(ecu: &'static str) -> Self {
        Self { ecu }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let ecu = self.ecu;
        match event {
            AppEvent::Started(status) => {
                info!("START | ecu={} | boot={:?}", ecu, status);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | ecu={} | {:?} -> {:?}", ecu, from, to);
            }
            AppEvent::DecisionMade(decision) => {
                info!("DECIDE | ecu={} | {:?}", ecu, decision);
            }
            AppEvent::VerdictReached(verdict) => {
                info!("VERDICT | ecu={} | {:?}", ecu, verdict);
            }
            AppEvent::AttemptFailed {
                attempts,
                max_attempts,
            } => {
                warn!("ATTEMPT | ecu={} | failed={}/{}", ecu, attempts, max_attempts);
            }
            AppEvent::PasswordChanged => {
                info!("PASSWD | ecu={} | changed", ecu);
            }
            AppEvent::DoorPhaseDone(phase) => {
                info!("DOOR | ecu={} | {:?} done", ecu, phase);
            }
            AppEvent::AlarmRaised => {
                warn!("ALARM | ecu={} | raised", ecu);
            }
            AppEvent::AlarmCleared => {
                info!("ALARM | ecu={} | cleared", ecu);
            }
        }
    }
}
