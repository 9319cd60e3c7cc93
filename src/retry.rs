//! Retry with exponential back-off.
//!
//! [`retry_with_backoff`] re-runs a fallible operation while the caller's
//! predicate says the error is worth retrying. The delay starts at
//! [`RetryPolicy::base_delay`] and doubles after every failed attempt, with no
//! jitter and no cap.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Sleep durations between attempts, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        std::iter::successors(Some(self.base_delay), |d| Some(d.saturating_mul(2)))
            .take(self.max_retries as usize)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Retry predicate that matches every error.
pub fn any_error<E>(_: &E) -> bool {
    true
}

/// Runs `operation` up to `policy.max_retries + 1` times, blocking the thread
/// between attempts.
pub fn retry_with_backoff<T, E, P, F>(
    policy: &RetryPolicy,
    operation_name: &str,
    should_retry: P,
    operation: F,
) -> Result<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
    F: FnMut() -> Result<T, E>,
{
    retry_with_backoff_using(policy, operation_name, should_retry, thread::sleep, operation)
}

/// Same as [`retry_with_backoff`] with a caller-supplied sleep.
pub fn retry_with_backoff_using<T, E, P, S, F>(
    policy: &RetryPolicy,
    operation_name: &str,
    should_retry: P,
    mut sleep: S,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
    S: FnMut(Duration),
    F: FnMut() -> Result<T, E>,
{
    let mut delays = policy.delays();
    let mut attempt = 0u32;
    loop {
        let err = match operation() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !should_retry(&err) {
            return Err(err);
        }
        attempt += 1;
        let Some(delay) = delays.next() else {
            error!(
                action = "exhausted",
                component = "retry",
                operation = operation_name,
                attempts = attempt,
                error = %err,
                "Operation failed after all retries"
            );
            return Err(err);
        };
        warn!(
            action = "retry",
            component = "retry",
            operation = operation_name,
            attempt,
            max_retries = policy.max_retries,
            delay_secs = delay.as_secs_f64(),
            error = %err,
            "Operation failed, retrying after back-off"
        );
        sleep(delay);
    }
}
