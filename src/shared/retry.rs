//! Bounded retry for transient storage failures.
//!
//! The ledger uses this to retry a lost availability race exactly once
//! before reporting the stay as unavailable.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// Retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause before the next attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    /// One retry after a short pause.
    pub fn once() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(25),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy
/// runs out of attempts. `should_retry` decides which errors are transient.
pub async fn retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < policy.max_attempts && should_retry(&err) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_transient_error_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry(
            &fast(),
            "test",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err("busy".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            |e| e == "busy",
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry(
            &fast(),
            "test",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("busy".to_string()) }
            },
            |_| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry(
            &fast(),
            "test",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad input".to_string()) }
            },
            |e| e == "busy",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
