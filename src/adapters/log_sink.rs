//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing dispense events to the `log`
//! facade (rendered by the tracing subscriber installed in `main`).
//! Per-poll chatter goes out at debug level.

use log::{debug, info, warn};

use crate::app::events::DispenseEvent;
use crate::app::ports::EventSink;
use crate::app::service::DispenseOutcome;

/// Adapter that logs every [`DispenseEvent`].
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
    fn emit(&self, event: &DispenseEvent) {
        match event {
            DispenseEvent::Rejected { token } => {
                warn!("REJECT | token={:?}", token);
            }
            DispenseEvent::PhaseChanged { from, to } => {
                debug!("PHASE | {:?} -> {:?}", from, to);
            }
            DispenseEvent::Sent(selection) => {
                info!("SEND | {} code={}", selection, selection.code());
            }
            DispenseEvent::Polled { attempt, byte } => {
                debug!("POLL | #{} byte=0x{:02X}", attempt, byte);
            }
            DispenseEvent::PollFailed { attempt, reason } => {
                warn!("POLL | #{} failed: {}", attempt, reason);
            }
            DispenseEvent::Finished(outcome) => match outcome {
                DispenseOutcome::Acknowledged { selection, polls } => {
                    info!("DISPENSE | {} acknowledged after {} polls", selection, polls);
                }
                DispenseOutcome::TimedOut { selection, polls } => {
                    warn!("DISPENSE | {} timed out after {} polls (uncertain)", selection, polls);
                }
                DispenseOutcome::InvalidSelection { token } => {
                    info!("DISPENSE | invalid selection {:?}", token);
                }
                DispenseOutcome::TransportUnavailable { selection, reason } => {
                    warn!("DISPENSE | {} bus unavailable: {}", selection, reason);
                }
                DispenseOutcome::TransportError { selection, reason } => {
                    warn!("DISPENSE | {} bus error (uncertain): {}", selection, reason);
                }
            },
        }
    }
}
