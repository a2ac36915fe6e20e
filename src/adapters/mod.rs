//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `i2c`       | DispenseTransport  | embedded-hal I2C (`/dev/i2c-N`) |
//! | `simulated` | DispenseTransport  | in-memory MCU stand-in        |
//! | `time`      | DelayPort          | tokio timer                   |
//! | `log_sink`  | EventSink          | `log` facade                  |
//! | `process`   | (none)             | TTS program, refresh script   |

pub mod i2c;
pub mod log_sink;
pub mod process;
pub mod simulated;
pub mod time;
