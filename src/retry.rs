//! Bounded retry-with-delay combinator.
//!
//! [`poll_until`] sleeps, probes, and stops as soon as the probe yields a
//! value accepted by the predicate, or when the attempt budget runs out.
//! The delay goes through a [`DelayPort`] so tests can run the full
//! budget without waiting on a real clock.

use std::time::Duration;

use crate::app::ports::DelayPort;

/// Attempt budget and spacing for a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Total time spent sleeping if every attempt is used.  Saturates
    /// instead of overflowing.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The predicate accepted `value` on attempt number `attempts`.
    Satisfied { value: T, attempts: u32 },
    /// The budget ran out; `attempts == policy.max_attempts()`.
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Satisfied { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Sleep `policy.interval()`, call `probe(attempt)`, repeat.
///
/// `probe` receives the 1-based attempt number.  A `None` from the probe
/// counts as an unsatisfied attempt and polling continues.  Probes are
/// strictly sequential, and each one is preceded by exactly one delay.
pub async fn poll_until<D, T, F, P>(
    policy: &RetryPolicy,
    delay: &D,
    mut probe: F,
    done: P,
) -> PollOutcome<T>
where
    D: DelayPort + ?Sized,
    F: FnMut(u32) -> Option<T>,
    P: Fn(&T) -> bool,
{
    let mut attempts = 0;
    while attempts < policy.max_attempts() {
        delay.delay(policy.interval()).await;
        attempts += 1;
        if let Some(value) = probe(attempts) {
            if done(&value) {
                return PollOutcome::Satisfied { value, attempts };
            }
        }
    }
    PollOutcome::Exhausted { attempts }
}
