//! Host configuration parameters
//!
//! All tunable parameters for the dispenser host.  Defaults carry the
//! values the kiosk hardware was built around; a JSON file and CLI flags
//! can override them.  Field names on disk are camelCase.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::{DEFAULT_BUS_INDEX, DEFAULT_DEVICE_ADDRESS};
use crate::retry::RetryPolicy;

/// Longest accepted gap between acknowledgment polls.
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    pub server: ServerConfig,
    pub dispenser: DispenserConfig,
    pub narration: NarrationConfig,
    pub question_bank: QuestionBankConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
        }
    }
}

/// I2C handshake parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispenserConfig {
    /// Which I2C bus to open (`/dev/i2c-<busIndex>`)
    pub bus_index: u8,
    /// 7-bit address of the dispenser MCU
    pub device_address: u8,
    /// Delay before each acknowledgment poll (milliseconds)
    pub poll_interval_ms: u64,
    /// Poll budget before the attempt is declared timed out
    pub max_attempts: u32,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            bus_index: DEFAULT_BUS_INDEX,
            device_address: DEFAULT_DEVICE_ADDRESS,
            poll_interval_ms: 100,
            max_attempts: 20, // ≈2 s total
        }
    }
}

impl DispenserConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.poll_interval_ms))
    }
}

/// Text-to-speech program used by `/speak`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrationConfig {
    pub program: String,
    /// Arguments placed before the text
    pub args: Vec<String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            args: ["-p", "50", "-s", "150", "-a", "200"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Question-bank refresh script used by `/trigger-fetch-and-prepare`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionBankConfig {
    pub interpreter: String,
    pub script: String,
    pub working_dir: PathBuf,
}

impl Default for QuestionBankConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            script: "fetch_and_prepare.py".into(),
            working_dir: PathBuf::from("."),
        }
    }
}

impl HostConfig {
    /// Read a JSON config file.  Missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dispenser;
        if d.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed("dispenser.maxAttempts must be at least 1"));
        }
        if d.poll_interval_ms == 0 || d.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::ValidationFailed(
                "dispenser.pollIntervalMs must be between 1 and 60000",
            ));
        }
        // 0x00-0x02 and 0x78-0x7F are reserved I2C addresses
        if !(0x03..=0x77).contains(&d.device_address) {
            return Err(ConfigError::ValidationFailed(
                "dispenser.deviceAddress must be a 7-bit address in 0x03..=0x77",
            ));
        }
        if self.narration.program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("narration.program must not be empty"));
        }
        if self.question_bank.interpreter.trim().is_empty()
            || self.question_bank.script.trim().is_empty()
        {
            return Err(ConfigError::ValidationFailed(
                "questionBank.interpreter and questionBank.script must not be empty",
            ));
        }
        Ok(())
    }
}
