//! SweeTrivia candy dispenser host library.
//!
//! Exposes the dispense handshake, its adapters and the HTTP surface for
//! integration testing.  The Linux I2C adapter is guarded by the
//! `hardware` feature; everything else builds on any host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod retry;
