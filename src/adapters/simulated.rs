//! Simulated dispenser bus.
//!
//! Stands in for the MCU when the kiosk runs without hardware
//! (`--simulate`).  Answers `0x00` until `ack_after` polls have been
//! made, then [`ACK_BYTE`].  `ack_after = 0` never acknowledges, which
//! exercises the timeout path end to end.

use log::info;

use crate::app::ports::{DispenseTransport, TransportHandle};
use crate::error::TransportFault;
use crate::protocol::{ACK_BYTE, CandySelection};

pub struct SimulatedTransport {
    ack_after: u32,
}

impl SimulatedTransport {
    pub fn new(ack_after: u32) -> Self {
        Self { ack_after }
    }
}

impl DispenseTransport for SimulatedTransport {
    type Handle = SimulatedHandle;

    fn acquire(&mut self) -> Result<SimulatedHandle, TransportFault> {
        Ok(SimulatedHandle {
            ack_after: self.ack_after,
            polls: 0,
            sent: None,
        })
    }
}

pub struct SimulatedHandle {
    ack_after: u32,
    polls: u32,
    sent: Option<CandySelection>,
}

impl TransportHandle for SimulatedHandle {
    fn send(&mut self, selection: CandySelection) -> Result<(), TransportFault> {
        info!("SIM | dispensing {} (code {})", selection, selection.code());
        self.sent = Some(selection);
        Ok(())
    }

    fn poll_ack(&mut self) -> Result<u8, TransportFault> {
        self.polls += 1;
        let ready = self.sent.is_some() && self.ack_after > 0 && self.polls >= self.ack_after;
        Ok(if ready { ACK_BYTE } else { 0x00 })
    }

    fn release(self) {}
}
