//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific layer
//! against the fake bus.  All tests run on the host with no I2C hardware
//! required.

mod dispense_tests;
mod mock_bus;
