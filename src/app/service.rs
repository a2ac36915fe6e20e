//! Dispense service: the hexagonal core.
//!
//! [`DispenseService`] owns the single-slot bus lock, the retry policy and
//! the event sink.  It runs one request→poll→acknowledge handshake per
//! call and always returns a [`DispenseOutcome`]; transport faults never
//! escape as errors.
//!
//! ```text
//!                 ┌────────────────────────────┐
//!  DelayPort ───▶ │      DispenseService       │ ──▶ EventSink
//!                 │  lock · lease · poll loop  │
//!  Transport ◀──▶ └────────────────────────────┘
//! ```
//!
//! Attempt phases:
//!
//! ```text
//!   Idle ─▶ Sending ─▶ Polling ─▶ Acknowledged
//!              │           └────▶ TimedOut
//!              └──────────────▶ Faulted   (bus unavailable / write failed)
//! ```

use log::{info, warn};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::protocol::{CandySelection, is_ack};
use crate::retry::{PollOutcome, RetryPolicy, poll_until};

use super::events::DispenseEvent;
use super::ports::{BusLease, DelayPort, DispenseTransport, EventSink};

// ───────────────────────────────────────────────────────────────
// Outcome types
// ───────────────────────────────────────────────────────────────

/// Terminal result of one `dispense` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DispenseOutcome {
    /// The MCU answered [`ACK_BYTE`](crate::protocol::ACK_BYTE) on poll `polls`.
    Acknowledged { selection: CandySelection, polls: u32 },
    /// The poll budget ran out.  The candy may still have dropped.
    TimedOut { selection: CandySelection, polls: u32 },
    /// The token named no candy.
    InvalidSelection { token: String },
    /// The bus could not be opened; nothing was sent.
    TransportUnavailable { selection: CandySelection, reason: String },
    /// The selection byte could not be written.
    TransportError { selection: CandySelection, reason: String },
}

/// What the caller may conclude about the physical candy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Delivery {
    /// The MCU confirmed the drop.
    Confirmed,
    /// The byte may have reached the MCU; treat as a soft failure.
    Uncertain,
    /// No byte reached the bus.
    NotDispensed,
}

impl DispenseOutcome {
    pub fn delivery(&self) -> Delivery {
        match self {
            Self::Acknowledged { .. } => Delivery::Confirmed,
            Self::TimedOut { .. } | Self::TransportError { .. } => Delivery::Uncertain,
            Self::InvalidSelection { .. } | Self::TransportUnavailable { .. } => {
                Delivery::NotDispensed
            }
        }
    }

    /// Number of acknowledgment polls issued.
    pub fn polls(&self) -> u32 {
        match self {
            Self::Acknowledged { polls, .. } | Self::TimedOut { polls, .. } => *polls,
            _ => 0,
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, Self::Acknowledged { .. })
    }
}

/// Protocol phase of an in-flight attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptPhase {
    Idle,
    Sending,
    Polling,
    Acknowledged,
    TimedOut,
    Faulted,
}

impl AttemptPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged | Self::TimedOut | Self::Faulted)
    }
}

// ───────────────────────────────────────────────────────────────
// DispenseService
// ───────────────────────────────────────────────────────────────

/// Runs dispense handshakes, one at a time per bus.
pub struct DispenseService<T: DispenseTransport, D: DelayPort> {
    /// Held for the whole acquire…release span of an attempt.
    transport: Mutex<T>,
    delay: D,
    policy: RetryPolicy,
    sink: Box<dyn EventSink>,
}

impl<T: DispenseTransport, D: DelayPort> DispenseService<T, D> {
    pub fn new(transport: T, delay: D, policy: RetryPolicy, sink: Box<dyn EventSink>) -> Self {
        Self {
            transport: Mutex::new(transport),
            delay,
            policy,
            sink,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// True while an attempt holds the bus.
    pub fn is_busy(&self) -> bool {
        self.transport.try_lock().is_err()
    }

    /// Validate `token` and run the full handshake.
    ///
    /// Concurrent callers queue on the bus lock.  An unmapped token returns
    /// immediately without waiting for or touching the bus.
    pub async fn dispense(&self, token: &str) -> DispenseOutcome {
        match CandySelection::from_token(token) {
            Some(selection) => self.dispense_selection(selection).await,
            None => {
                warn!("Rejected candy type {:?}", token);
                self.sink.emit(&DispenseEvent::Rejected {
                    token: token.to_string(),
                });
                let outcome = DispenseOutcome::InvalidSelection {
                    token: token.to_string(),
                };
                self.sink.emit(&DispenseEvent::Finished(outcome.clone()));
                outcome
            }
        }
    }

    /// Run the handshake for an already-validated selection.
    pub async fn dispense_selection(&self, selection: CandySelection) -> DispenseOutcome {
        let mut transport = self.transport.lock().await;
        let outcome = self.run_attempt(&mut transport, selection).await;
        drop(transport);

        match &outcome {
            DispenseOutcome::Acknowledged { polls, .. } => {
                info!("Candy {} dispensed (ack after {} polls)", selection, polls);
            }
            DispenseOutcome::TimedOut { polls, .. } => {
                warn!("Timeout waiting for ack for {} after {} polls", selection, polls);
            }
            DispenseOutcome::TransportUnavailable { reason, .. }
            | DispenseOutcome::TransportError { reason, .. } => {
                warn!("I2C communication failed for {}: {}", selection, reason);
            }
            DispenseOutcome::InvalidSelection { .. } => {}
        }
        self.sink.emit(&DispenseEvent::Finished(outcome.clone()));
        outcome
    }

    /// Body of one attempt.  The lease never outlives this call, so the bus
    /// is closed before the caller drops the lock guard.
    async fn run_attempt(&self, transport: &mut T, selection: CandySelection) -> DispenseOutcome {
        let mut phase = AttemptPhase::Idle;
        self.enter(&mut phase, AttemptPhase::Sending);

        let handle = match transport.acquire() {
            Ok(h) => h,
            Err(fault) => {
                self.enter(&mut phase, AttemptPhase::Faulted);
                return DispenseOutcome::TransportUnavailable {
                    selection,
                    reason: fault.to_string(),
                };
            }
        };
        let mut lease = BusLease::new(handle);

        info!("Sending candy selection: {} (code {})", selection, selection.code());
        if let Err(fault) = lease.send(selection) {
            lease.release();
            self.enter(&mut phase, AttemptPhase::Faulted);
            return DispenseOutcome::TransportError {
                selection,
                reason: fault.to_string(),
            };
        }
        self.sink.emit(&DispenseEvent::Sent(selection));
        self.enter(&mut phase, AttemptPhase::Polling);

        let sink = &*self.sink;
        let polled = poll_until(
            &self.policy,
            &self.delay,
            |attempt| match lease.poll_ack() {
                Ok(byte) => {
                    sink.emit(&DispenseEvent::Polled { attempt, byte });
                    Some(byte)
                }
                Err(fault) => {
                    warn!("Ack poll {} failed, treating as not ready: {}", attempt, fault);
                    sink.emit(&DispenseEvent::PollFailed {
                        attempt,
                        reason: fault.to_string(),
                    });
                    None
                }
            },
            |byte| is_ack(*byte),
        )
        .await;
        lease.release();

        match polled {
            PollOutcome::Satisfied { attempts, .. } => {
                self.enter(&mut phase, AttemptPhase::Acknowledged);
                DispenseOutcome::Acknowledged {
                    selection,
                    polls: attempts,
                }
            }
            PollOutcome::Exhausted { attempts } => {
                self.enter(&mut phase, AttemptPhase::TimedOut);
                DispenseOutcome::TimedOut {
                    selection,
                    polls: attempts,
                }
            }
        }
    }

    fn enter(&self, phase: &mut AttemptPhase, next: AttemptPhase) {
        let from = *phase;
        *phase = next;
        self.sink.emit(&DispenseEvent::PhaseChanged { from, to: next });
    }
}
