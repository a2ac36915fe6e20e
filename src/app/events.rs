//! Outbound dispense events.
//!
//! The [`DispenseService`](super::service::DispenseService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log lines, counters, a
//! recording sink in tests.

use crate::protocol::CandySelection;

use super::service::{AttemptPhase, DispenseOutcome};

/// Structured events emitted by the dispense core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispenseEvent {
    /// The token did not name a candy; the bus was not touched.
    Rejected { token: String },

    /// An attempt moved between protocol phases.
    PhaseChanged { from: AttemptPhase, to: AttemptPhase },

    /// The selection byte went out on the bus.
    Sent(CandySelection),

    /// One acknowledgment poll returned `byte`.
    Polled { attempt: u32, byte: u8 },

    /// One acknowledgment poll failed; counted as "not yet".
    PollFailed { attempt: u32, reason: String },

    /// Terminal result of an attempt.
    Finished(DispenseOutcome),
}
