//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | waiting for tag"),
            AppEvent::StepChanged { from, to } => {
                info!("STEP  | {} -> {}", from.name(), to.name());
            }
            AppEvent::SessionStarted { identity } => {
                info!("SESS  | identity={}", identity);
            }
            AppEvent::AuthResolved { state } => {
                info!("AUTH  | state={:?}", state);
            }
            AppEvent::ItemScored {
                verdict,
                accepted,
                rejected,
            } => {
                info!(
                    "ITEM  | {:?} | accepted={} rejected={}",
                    verdict, accepted, rejected
                );
            }
            AppEvent::TriggerSent { step } => {
                info!("TRIG  | step={}", u8::from(*step));
            }
            AppEvent::SessionCancelled { remote } => {
                info!("SESS  | cancelled by {}", if *remote { "server" } else { "holder" });
            }
        }
    }
}
