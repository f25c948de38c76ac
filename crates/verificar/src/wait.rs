//! Explicit-wait policies and the bounded polling loop.
//!
//! Every wait is a blocking poll on the calling task up to a bounded timeout;
//! there is no cancellation primitive beyond the timeout itself.

use crate::result::{VerificarError, VerificarResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default polling interval between condition checks (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default timeout for collection lookups (30 seconds)
pub const SHORT_TIMEOUT_SECS: u64 = 30;

/// Default timeout for single-element lookups (60 seconds)
pub const LONG_TIMEOUT_SECS: u64 = 60;

/// Bounded wait configuration, scoped to a single lookup call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum time to keep polling
    pub timeout: Duration,
    /// Interval between polls
    pub poll_interval: Duration,
}

impl WaitPolicy {
    /// Named default for collection lookups (~30s)
    pub const SHORT: Self = Self {
        timeout: Duration::from_secs(SHORT_TIMEOUT_SECS),
        poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
    };

    /// Named default for single-element lookups (~60s)
    pub const LONG: Self = Self {
        timeout: Duration::from_secs(LONG_TIMEOUT_SECS),
        poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
    };

    /// Create an ad-hoc policy with the default poll interval
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::LONG
    }
}

/// Poll `probe` until it yields a value or the policy's budget elapses.
///
/// The probe returns `Ok(Some(v))` when the condition holds, `Ok(None)` to
/// keep polling; probe errors propagate immediately (the caller decides how
/// to classify driver faults).
///
/// # Errors
///
/// Returns [`VerificarError::Timeout`] when the budget elapses first.
pub async fn wait_until<T, F, Fut>(policy: WaitPolicy, mut probe: F) -> VerificarResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VerificarResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if start.elapsed() >= policy.timeout {
            return Err(VerificarError::Timeout {
                ms: policy.timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

/// Fixed pause with a stated reason, visible in the diagnostic log.
///
/// Sleeps in a budget-accounting loop: if a sleep returns short of the
/// requested duration, the remaining budget is slept again.
pub async fn pause(reason: &str, duration: Duration) {
    tracing::info!(?duration, reason, "pausing");
    let start = Instant::now();
    while start.elapsed() < duration {
        let remaining = duration.saturating_sub(start.elapsed());
        tokio::time::sleep(remaining).await;
    }
    tracing::debug!(reason, "unpaused");
}
