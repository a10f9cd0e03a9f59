//! Back-off policy for remote dataset fetches.

use std::future::Future;
use std::time::Duration;

use crate::error::ResolverError;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Doubling back-off with ±25 % jitter, capped at [`MAX_DELAY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            base: Duration::from_millis(backoff_base_ms),
        }
    }

    /// Un-jittered delay before the `retry`-th retry (1-based).
    fn base_delay(self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(10);
        self.base.saturating_mul(1 << doublings).min(MAX_DELAY)
    }

    fn jittered_delay(self, retry: u32) -> Duration {
        self.base_delay(retry).mul_f64(rand::random_range(0.75..1.25))
    }

    /// Runs `fetch` until it succeeds, fails with a non-transient error, or
    /// the retry budget is spent. The last error is returned as-is.
    pub(crate) async fn run<T, F, Fut>(self, mut fetch: F) -> Result<T, ResolverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResolverError>>,
    {
        let mut retry = 0;
        loop {
            let err = match fetch().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !err.is_transient() {
                return Err(err);
            }
            retry += 1;
            let delay = self.jittered_delay(retry);
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient fetch error, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn unavailable() -> ResolverError {
        ResolverError::UnexpectedStatus {
            status: 503,
            path: "data/x.csv".to_owned(),
        }
    }

    #[test]
    fn delay_doubles_per_retry_and_caps() {
        let policy = RetryPolicy::new(20, 500);
        assert_eq!(policy.base_delay(1), Duration::from_millis(500));
        assert_eq!(policy.base_delay(2), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay(4), Duration::from_millis(4_000));
        assert_eq!(policy.base_delay(15), MAX_DELAY);
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let policy = RetryPolicy::new(3, 1_000);
        for _ in 0..50 {
            let delay = policy.jittered_delay(1);
            assert!(delay >= Duration::from_millis(750), "{delay:?}");
            assert!(delay <= Duration::from_millis(1_250), "{delay:?}");
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(3, 0)
            .run(|| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok("body")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "body");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(2, 0)
            .run(|| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(unavailable())
            })
            .await;
        assert!(matches!(
            result,
            Err(ResolverError::UnexpectedStatus { status: 503, .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn missing_file_is_answered_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(3, 0)
            .run(|| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ResolverError::NotFound {
                    path: "data/x.csv".to_owned(),
                })
            })
            .await;
        assert!(matches!(result, Err(ResolverError::NotFound { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
