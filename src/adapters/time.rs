//! Tokio time adapter.
//!
//! Implements [`DelayPort`] with `tokio::time::sleep`, which parks the
//! task and frees the worker thread for other requests.  Under a paused
//! test clock (`start_paused = true`) the sleep auto-advances.

use std::future::Future;
use std::time::Duration;

use crate::app::ports::DelayPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

impl DelayPort for TokioDelay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
