//! Retry with exponential backoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time;

use crate::error::{WireError, WireResult};
use crate::observability::metrics;

/// Retry schedule shared by every public link operation.
///
/// The delay before the second attempt is `initial_delay_ms`; each further
/// delay is the previous one multiplied by `backoff_multiplier`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total invocation budget, counting the first attempt.
    pub max_attempts: u32,

    /// Sleep before the second attempt, in milliseconds.
    pub initial_delay_ms: u64,

    /// Factor applied to the delay after every failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 3_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Sleep before the second attempt.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Reject schedules that would never run or never back off.
    pub fn validate(&self) -> Result<(), WireError> {
        if self.max_attempts == 0 {
            return Err(WireError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.initial_delay_ms == 0 {
            return Err(WireError::Config(
                "initial_delay_ms must be greater than 0".into(),
            ));
        }
        if self.backoff_multiplier <= 1.0 {
            return Err(WireError::Config(
                "backoff_multiplier must be greater than 1".into(),
            ));
        }
        Ok(())
    }
}

/// Drives an operation until it succeeds, fails permanently, or the attempt
/// budget is spent.
///
/// Retryability is decided by [`WireError::is_retryable`]: configuration
/// errors surface immediately, transport-level failures are re-attempted
/// after an exponentially growing sleep. The final error is returned
/// verbatim once the budget is exhausted.
#[derive(Debug, Clone)]
pub struct Retrier {
    policy: RetryPolicy,
}

impl Retrier {
    /// Build a retrier, rejecting unsound policies with
    /// [`WireError::Config`] before any operation is attempted.
    pub fn new(policy: RetryPolicy) -> Result<Self, WireError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The schedule this retrier runs on.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `op` until it succeeds or the schedule gives up.
    ///
    /// `op_name` labels log lines and metrics; it does not affect behavior.
    pub async fn run<T, F>(&self, op_name: &'static str, mut op: F) -> WireResult<T>
    where
        F: AsyncFnMut() -> WireResult<T>,
    {
        let mut remaining = self.policy.max_attempts;
        let mut delay = self.policy.initial_delay();

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    remaining -= 1;
                    if remaining == 0 {
                        tracing::warn!(operation = op_name, %error, "retry budget exhausted");
                        metrics::record_retry_exhausted(op_name);
                        return Err(error);
                    }
                    tracing::debug!(
                        operation = op_name,
                        %error,
                        delay_ms = delay.as_millis() as u64,
                        remaining,
                        "transient failure, backing off"
                    );
                    metrics::record_retry(op_name);
                    time::sleep(delay).await;
                    delay = delay.mul_f64(self.policy.backoff_multiplier);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn policy(max_attempts: u32, initial_delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms,
            backoff_multiplier: 2.0,
        }
    }

    fn transient() -> WireError {
        WireError::Io(io::Error::other("boom"))
    }

    #[test]
    fn unsound_policies_are_rejected() {
        assert!(Retrier::new(policy(0, 100)).is_err());
        assert!(Retrier::new(policy(3, 0)).is_err());
        assert!(Retrier::new(RetryPolicy {
            backoff_multiplier: 1.0,
            ..RetryPolicy::default()
        })
        .is_err());
        assert!(Retrier::new(RetryPolicy::default()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn success_returns_without_further_attempts() {
        let retrier = Retrier::new(policy(5, 100)).unwrap();
        let mut calls = 0u32;
        let result = retrier
            .run("op", async || {
                calls += 1;
                Ok(42)
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failure_consumes_exactly_the_budget() {
        let retrier = Retrier::new(policy(3, 100)).unwrap();
        let mut calls = 0u32;
        let result: WireResult<()> = retrier
            .run("op", async || {
                calls += 1;
                Err(transient())
            })
            .await;
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(WireError::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_failure_is_invoked_once() {
        let retrier = Retrier::new(policy(5, 100)).unwrap();
        let mut calls = 0u32;
        let result: WireResult<()> = retrier
            .run("op", async || {
                calls += 1;
                Err(WireError::Config("bad".into()))
            })
            .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(WireError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_then_success_stops_retrying() {
        let retrier = Retrier::new(policy(5, 100)).unwrap();
        let mut calls = 0u32;
        let result = retrier
            .run("op", async || {
                calls += 1;
                if calls < 3 {
                    Err(transient())
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_grow_geometrically() {
        let retrier = Retrier::new(policy(4, 100)).unwrap();
        let started = time::Instant::now();
        let mut stamps = Vec::new();
        let _: WireResult<()> = retrier
            .run("op", async || {
                stamps.push(started.elapsed());
                Err(transient())
            })
            .await;

        // Attempts land at 0ms, then after sleeps of 100, 200, 400ms.
        assert_eq!(stamps.len(), 4);
        assert_eq!(stamps[0], Duration::from_millis(0));
        assert_eq!(stamps[1], Duration::from_millis(100));
        assert_eq!(stamps[2], Duration::from_millis(300));
        assert_eq!(stamps[3], Duration::from_millis(700));
    }
}
