//! Mock bus, clock and sink for integration tests.
//!
//! Every transport and delay call lands in one shared [`BusLog`], so tests
//! can assert on the exact interleaving of acquire, send, delay, poll and
//! release without touching `/dev/i2c-*`.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sweetrivia_dispenser::app::events::DispenseEvent;
use sweetrivia_dispenser::app::ports::{DelayPort, DispenseTransport, EventSink, TransportHandle};
use sweetrivia_dispenser::error::TransportFault;
use sweetrivia_dispenser::protocol::CandySelection;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Acquire,
    Send(u8),
    Delay(Duration),
    Poll,
    Release,
}

#[derive(Debug, Default)]
pub struct BusLog {
    pub calls: Vec<Call>,
    held: bool,
    /// Acquires that happened while another handle was still open.
    pub overlaps: u32,
}

pub type SharedLog = Arc<Mutex<BusLog>>;

pub fn new_log() -> SharedLog {
    Arc::new(Mutex::new(BusLog::default()))
}

#[allow(dead_code)]
impl BusLog {
    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    pub fn polls(&self) -> usize {
        self.count(|c| *c == Call::Poll)
    }

    pub fn acquires(&self) -> usize {
        self.count(|c| *c == Call::Acquire)
    }

    pub fn releases(&self) -> usize {
        self.count(|c| *c == Call::Release)
    }

    pub fn sends(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Send(code) => Some(*code),
                _ => None,
            })
            .collect()
    }
}

// ── FakeTransport ─────────────────────────────────────────────

pub struct FakeTransport {
    log: SharedLog,
    script: Vec<Result<u8, TransportFault>>,
    fail_acquire: bool,
    fail_send: bool,
    panic_on_poll: Option<u32>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new(log: &SharedLog) -> Self {
        Self {
            log: Arc::clone(log),
            script: Vec::new(),
            fail_acquire: false,
            fail_send: false,
            panic_on_poll: None,
        }
    }

    /// Bytes returned by successive polls; `0x00` once the script runs out.
    pub fn answering(mut self, bytes: impl IntoIterator<Item = u8>) -> Self {
        self.script = bytes.into_iter().map(Ok).collect();
        self
    }

    /// Poll results including read faults.
    pub fn answering_results(mut self, results: Vec<Result<u8, TransportFault>>) -> Self {
        self.script = results;
        self
    }

    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    /// Panic inside the `n`th poll (1-based).
    pub fn panicking_on_poll(mut self, n: u32) -> Self {
        self.panic_on_poll = Some(n);
        self
    }
}

impl DispenseTransport for FakeTransport {
    type Handle = FakeHandle;

    fn acquire(&mut self) -> Result<FakeHandle, TransportFault> {
        if self.fail_acquire {
            return Err(TransportFault::Unavailable("EBUSY".into()));
        }
        {
            let mut log = self.log.lock().unwrap();
            if log.held {
                log.overlaps += 1;
            }
            log.held = true;
            log.calls.push(Call::Acquire);
        }
        Ok(FakeHandle {
            log: Arc::clone(&self.log),
            script: self.script.iter().cloned().collect(),
            fail_send: self.fail_send,
            panic_on_poll: self.panic_on_poll,
            polls: 0,
        })
    }
}

pub struct FakeHandle {
    log: SharedLog,
    script: VecDeque<Result<u8, TransportFault>>,
    fail_send: bool,
    panic_on_poll: Option<u32>,
    polls: u32,
}

impl TransportHandle for FakeHandle {
    fn send(&mut self, selection: CandySelection) -> Result<(), TransportFault> {
        self.log.lock().unwrap().calls.push(Call::Send(selection.code()));
        if self.fail_send {
            return Err(TransportFault::Write("NoAcknowledge(Address)".into()));
        }
        Ok(())
    }

    fn poll_ack(&mut self) -> Result<u8, TransportFault> {
        self.polls += 1;
        self.log.lock().unwrap().calls.push(Call::Poll);
        if self.panic_on_poll == Some(self.polls) {
            panic!("injected poll panic");
        }
        self.script.pop_front().unwrap_or(Ok(0x00))
    }

    fn release(self) {
        let mut log = self.log.lock().unwrap();
        log.held = false;
        log.calls.push(Call::Release);
    }
}

// ── FakeDelay ─────────────────────────────────────────────────

/// Records the requested delay and returns at once.  With `yielding`,
/// it also yields to the scheduler so concurrent tasks interleave.
pub struct FakeDelay {
    log: SharedLog,
    yielding: bool,
}

#[allow(dead_code)]
impl FakeDelay {
    pub fn new(log: &SharedLog) -> Self {
        Self {
            log: Arc::clone(log),
            yielding: false,
        }
    }

    pub fn yielding(log: &SharedLog) -> Self {
        Self {
            log: Arc::clone(log),
            yielding: true,
        }
    }
}

impl DelayPort for FakeDelay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.log.lock().unwrap().calls.push(Call::Delay(duration));
        let yielding = self.yielding;
        async move {
            if yielding {
                tokio::task::yield_now().await;
            }
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<DispenseEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<DispenseEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &DispenseEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
