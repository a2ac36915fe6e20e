//! I2C adapter: bridges an `embedded-hal` bus to [`DispenseTransport`].
//!
//! Wire convention: a plain one-byte write of the selection code and a
//! plain one-byte read for the acknowledgment, both addressed to the
//! dispenser MCU.  No register/command byte is prefixed.
//!
//! The bus itself comes from a [`BusOpener`], so the same adapter drives
//! `/dev/i2c-N` on the kiosk (behind the `hardware` feature) and an
//! in-memory bus in tests.

use embedded_hal::i2c::I2c;
use log::debug;

use crate::app::ports::{DispenseTransport, TransportHandle};
use crate::error::TransportFault;
use crate::protocol::CandySelection;

/// Produces a fresh bus instance for one attempt.
pub trait BusOpener: Send + 'static {
    type Bus: I2c + Send;

    fn open(&mut self, bus_index: u8) -> Result<Self::Bus, TransportFault>;
}

/// Transport that opens `bus_index` through `O` on every acquire.
pub struct I2cTransport<O> {
    opener: O,
    bus_index: u8,
    address: u8,
}

impl<O: BusOpener> I2cTransport<O> {
    pub fn new(opener: O, bus_index: u8, address: u8) -> Self {
        Self {
            opener,
            bus_index,
            address,
        }
    }
}

impl<O: BusOpener> DispenseTransport for I2cTransport<O> {
    type Handle = I2cHandle<O::Bus>;

    fn acquire(&mut self) -> Result<Self::Handle, TransportFault> {
        let bus = self.opener.open(self.bus_index)?;
        debug!("I2C bus {} opened", self.bus_index);
        Ok(I2cHandle {
            bus,
            address: self.address,
            bus_index: self.bus_index,
        })
    }
}

/// An open bus addressed at the dispenser MCU.
pub struct I2cHandle<B> {
    bus: B,
    address: u8,
    bus_index: u8,
}

impl<B: I2c + Send> TransportHandle for I2cHandle<B> {
    fn send(&mut self, selection: CandySelection) -> Result<(), TransportFault> {
        self.bus
            .write(self.address, &[selection.code()])
            .map_err(|e| TransportFault::Write(format!("{e:?}")))
    }

    fn poll_ack(&mut self) -> Result<u8, TransportFault> {
        let mut buf = [0u8; 1];
        self.bus
            .read(self.address, &mut buf)
            .map_err(|e| TransportFault::Read(format!("{e:?}")))?;
        Ok(buf[0])
    }

    fn release(self) {
        // Dropping the bus closes the device file.
        drop(self.bus);
        debug!("I2C bus {} closed", self.bus_index);
    }
}

// ── Linux /dev/i2c-N ──────────────────────────────────────────

#[cfg(feature = "hardware")]
pub use linux::LinuxBusOpener;

#[cfg(feature = "hardware")]
mod linux {
    use linux_embedded_hal::I2cdev;

    use super::BusOpener;
    use crate::error::TransportFault;

    /// Opens `/dev/i2c-<bus_index>`.
    pub struct LinuxBusOpener;

    impl BusOpener for LinuxBusOpener {
        type Bus = I2cdev;

        fn open(&mut self, bus_index: u8) -> Result<I2cdev, TransportFault> {
            let path = format!("/dev/i2c-{bus_index}");
            I2cdev::new(&path).map_err(|e| TransportFault::Unavailable(format!("{path}: {e}")))
        }
    }
}
