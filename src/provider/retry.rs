//! provider::retry
//!
//! Bounded retry with exponential backoff, and cancellation racing.
//!
//! # Policy
//!
//! - 3 total attempts
//! - Backoff starts at 500 ms and doubles
//! - Only errors where [`ProviderError::is_retryable`] holds are retried
//! - A cancelled token stops everything, including a pending backoff

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::traits::ProviderError;

/// Retry policy for provider requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(
        &self,
        provider: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut retry = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(ProviderError::cancelled(provider));
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry + 1 < self.max_attempts => {
                    let delay = self.backoff(retry);
                    retry += 1;
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ProviderError::cancelled(provider)),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Await `fut` unless `cancel` fires first.
pub async fn race_cancel<T, Fut>(
    provider: &str,
    cancel: &CancellationToken,
    fut: Fut,
) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::cancelled(provider)),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn retries_retryable_errors_up_to_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let counter = calls.clone();

        let result: Result<(), _> = fast()
            .run("test", &cancel, || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ProviderError::status("test", 503, ""))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let counter = calls.clone();

        let result: Result<(), _> = fast()
            .run("test", &cancel, || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ProviderError::status("test", 400, "bad request"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, ProviderErrorKind::Status(400));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let counter = calls.clone();

        let result = fast()
            .run("test", &cancel, || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ProviderError::status("test", 429, ""))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_first_attempt() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), _> = fast()
            .run("test", &cancel, || async { Ok(()) })
            .await;

        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn race_cancel_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), _> = race_cancel("test", &cancel, std::future::pending()).await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
