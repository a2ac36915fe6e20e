//! Application core: the dispense handshake, zero direct I/O.
//!
//! All interaction with the bus and the clock happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without a dispenser attached.

pub mod events;
pub mod ports;
pub mod service;
