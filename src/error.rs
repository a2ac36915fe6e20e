//! Error types for the dispenser host.
//!
//! Port-level faults are plain enums with hand-written `Display` impls so
//! they can cross the adapter boundary without pulling in an error crate.
//! The request handler never lets these escape: it folds them into the
//! exhaustive [`DispenseOutcome`](crate::app::service::DispenseOutcome).

use core::fmt;

// ---------------------------------------------------------------------------
// Transport faults
// ---------------------------------------------------------------------------

/// Failure reported by a [`DispenseTransport`](crate::app::ports::DispenseTransport)
/// or one of its handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// The bus device could not be opened (absent, busy, permissions).
    Unavailable(String),
    /// The selection byte could not be written.
    Write(String),
    /// An acknowledgment read failed.
    Read(String),
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "bus unavailable: {msg}"),
            Self::Write(msg) => write!(f, "bus write failed: {msg}"),
            Self::Read(msg) => write!(f, "bus read failed: {msg}"),
        }
    }
}

impl std::error::Error for TransportFault {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`HostConfig`](crate::config::HostConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config file is not valid JSON for the schema.
    Parse(serde_json::Error),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::ValidationFailed(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// External process errors
// ---------------------------------------------------------------------------

/// Errors from launching the narration or question-refresh programs.
#[derive(Debug)]
pub enum ProcessError {
    /// The program could not be started at all.
    Spawn(std::io::Error),
    /// The program ran but exited unsuccessfully.
    Failed { code: Option<i32>, stderr: String },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to start: {e}"),
            Self::Failed { code: Some(c), stderr } => write!(f, "exit code {c}: {stderr}"),
            Self::Failed { code: None, stderr } => write!(f, "terminated by signal: {stderr}"),
        }
    }
}

impl std::error::Error for ProcessError {}
