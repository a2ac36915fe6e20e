//! Port traits: the hexagonal boundary between the dispense protocol and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DispenseService (domain)
//! ```
//!
//! Driven adapters (I2C bus, clock, event sinks) implement these traits.
//! The [`DispenseService`](super::service::DispenseService) consumes them
//! via generics, so the protocol never touches `/dev/i2c-*` directly.
//!
//! ## Bus ownership
//!
//! - [`DispenseTransport::acquire`] opens a fresh handle per attempt; no
//!   handle outlives the request that opened it.
//! - A handle is wrapped in a [`BusLease`] the moment it is acquired.  The
//!   lease calls [`TransportHandle::release`] exactly once, on the normal
//!   path or on drop (early return, panic unwind).
//! - Transports do not arbitrate between callers.  Mutual exclusion is the
//!   service's job.

use std::future::Future;
use std::time::Duration;

use crate::error::TransportFault;
use crate::protocol::CandySelection;

use super::events::DispenseEvent;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ I2C bus)
// ───────────────────────────────────────────────────────────────

/// Opens the dispenser bus.  One instance per configured bus index.
pub trait DispenseTransport: Send + 'static {
    type Handle: TransportHandle;

    /// Open the bus.  Fails with [`TransportFault::Unavailable`].
    fn acquire(&mut self) -> Result<Self::Handle, TransportFault>;
}

/// An open bus, exclusively owned by one dispense attempt.
pub trait TransportHandle: Send {
    /// Write the selection code as a single byte.  Never retries.
    fn send(&mut self, selection: CandySelection) -> Result<(), TransportFault>;

    /// One single-byte read.  Returns whatever the device answered;
    /// deciding whether it is an ack is the caller's business.
    fn poll_ack(&mut self) -> Result<u8, TransportFault>;

    /// Close the bus.
    fn release(self);
}

/// Scoped ownership of a [`TransportHandle`].
///
/// Release happens in [`BusLease::release`] or, failing that, in `Drop`.
pub struct BusLease<H: TransportHandle> {
    handle: Option<H>,
}

impl<H: TransportHandle> BusLease<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn send(&mut self, selection: CandySelection) -> Result<(), TransportFault> {
        match self.handle.as_mut() {
            Some(h) => h.send(selection),
            None => Err(Self::released_fault()),
        }
    }

    pub fn poll_ack(&mut self) -> Result<u8, TransportFault> {
        match self.handle.as_mut() {
            Some(h) => h.poll_ack(),
            None => Err(Self::released_fault()),
        }
    }

    /// Release now instead of at end of scope.
    pub fn release(mut self) {
        if let Some(h) = self.handle.take() {
            h.release();
        }
    }

    fn released_fault() -> TransportFault {
        TransportFault::Unavailable("bus lease already released".into())
    }
}

impl<H: TransportHandle> Drop for BusLease<H> {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            h.release();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Delay port (driven adapter: domain → clock)
// ───────────────────────────────────────────────────────────────

/// Suspends the current task.  Must yield to the scheduler rather than
/// block a runtime thread.
pub trait DelayPort: Send + Sync + 'static {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`DispenseEvent`]s through this port.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &DispenseEvent);
}

/// Discards every event.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: &DispenseEvent) {}
}
