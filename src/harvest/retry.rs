//! Uniform retry policy for network operations
//!
//! Every network call in the harvester (detail fetch, chapter fetch, store
//! read/write) runs under the same policy: up to `max_attempts` tries,
//! rate-limit responses wait out a randomized backoff, other transient
//! failures retry immediately, and exhaustion surfaces as a typed error the
//! caller must handle.

use crate::config::HttpConfig;
use crate::{FetchError, FetchResult};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_min: Duration,
    backoff_max: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_min: Duration, backoff_max: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_min,
            backoff_max,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_min_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }

    /// Runs `op` until it succeeds, fails terminally, or attempts run out
    ///
    /// Non-retryable errors (4xx other than the rate-limit statuses) are
    /// returned as-is on the first occurrence. Retryable errors are retried
    /// up to the attempt cap; rate limits sleep a randomized interval first.
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> FetchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        let mut last: Option<FetchError> = None;

        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }

                    if attempt == self.max_attempts {
                        last = Some(err);
                        break;
                    }

                    if err.is_rate_limit() {
                        let wait = self.backoff();
                        tracing::warn!(
                            "{} rate limited (attempt {}/{}), backing off {:?}",
                            url,
                            attempt,
                            self.max_attempts,
                            wait
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        tracing::debug!(
                            "{} failed (attempt {}/{}): {}",
                            url,
                            attempt,
                            self.max_attempts,
                            err
                        );
                    }

                    last = Some(err);
                }
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// A uniformly random wait within the configured backoff range
    fn backoff(&self) -> Duration {
        use rand::Rng;

        let min = self.backoff_min.as_millis() as u64;
        let max = self.backoff_max.as_millis() as u64;
        let ms = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("https://x.test/", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_retry_up_to_cap() {
        let calls = AtomicU32::new(0);
        let result: FetchResult<u32> = policy(3)
            .run("https://x.test/", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Timeout {
                    url: "https://x.test/".to_string(),
                })
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(FetchError::Exhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("https://x.test/", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError::Network {
                        url: "https://x.test/".to_string(),
                        message: "connection reset".to_string(),
                    })
                } else {
                    Ok("body".to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap(), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: FetchResult<u32> = policy(3)
            .run("https://x.test/", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Status {
                    url: "https://x.test/".to_string(),
                    status: 404,
                })
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_rate_limit_retries_with_backoff() {
        let calls = AtomicU32::new(0);
        let result = policy(2)
            .run("https://x.test/", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(FetchError::RateLimited {
                        url: "https://x.test/".to_string(),
                        status: 429,
                    })
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
