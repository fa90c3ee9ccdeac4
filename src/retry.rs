//! Bounded retry with rate-limit-aware backoff for calls to the
//! authorization server.
//!
//! A failed attempt is retried when [`ExchangeError::is_retryable`] says so.
//! The wait before the next attempt is the server's `Retry-After` value when
//! one was sent, otherwise exponential backoff keyed by the attempt number.

use std::future::Future;
use std::time::Duration;

use crate::error::ExchangeError;

/// Retry budget and backoff schedule.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Three retries after the first attempt, 100ms doubling backoff capped at 30s.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of retries allowed after the first attempt.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    #[must_use]
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Retries allowed after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Exponential delay for a zero-based attempt number: `initial * 2^attempt`, capped.
    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .checked_mul(2_u32.saturating_pow(attempt))
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Delay before retrying after `error` on the given attempt.
    ///
    /// A server-provided `Retry-After` wins over the computed backoff.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ExchangeError) -> Duration {
        error
            .retry_after()
            .unwrap_or_else(|| self.backoff(attempt))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget runs out.
    ///
    /// `op` receives the zero-based attempt number.
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned as-is. When every attempt failed with
    /// a retryable error, returns [`ExchangeError::Exhausted`] wrapping the last one.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ExchangeError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        let mut attempt = 0;
        loop {
            let error = match op(attempt).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt >= self.max_retries {
                tracing::error!(attempts = attempt + 1, error = %error, "Retry budget exhausted");
                return Err(ExchangeError::Exhausted {
                    attempts: attempt + 1,
                    last: Box::new(error),
                });
            }

            let delay = self.delay_for(attempt, &error);
            tracing::warn!(
                attempt = attempt + 1,
                max_retries = self.max_retries,
                delay_ms = millis(delay),
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Whole milliseconds of `d`, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Parse a `Retry-After` header value given in whole seconds.
///
/// HTTP-date values are not supported and yield `None`.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[test]
    fn exponential_backoff_calculation() {
        let policy = RetryPolicy::new().with_initial_backoff(Duration::from_millis(100));

        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn backoff_respects_max() {
        let policy = RetryPolicy::new()
            .with_initial_backoff(Duration::from_secs(1))
            .with_max_backoff(Duration::from_secs(5));

        assert_eq!(policy.backoff(10), Duration::from_secs(5));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[test]
    fn retry_after_overrides_backoff() {
        let policy = RetryPolicy::new().with_initial_backoff(Duration::from_secs(10));
        let limited = ExchangeError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        let unlimited = ExchangeError::RateLimited { retry_after: None };

        assert_eq!(policy.delay_for(3, &limited), Duration::from_secs(2));
        assert_eq!(policy.delay_for(0, &unlimited), Duration::from_secs(10));
    }

    #[test]
    fn retry_after_on_server_error_overrides_backoff() {
        let policy = RetryPolicy::new().with_initial_backoff(Duration::from_secs(10));
        let unavailable = |retry_after| ExchangeError::UpstreamUnavailable {
            status: 503,
            detail: String::new(),
            retry_after,
        };

        assert_eq!(
            policy.delay_for(0, &unavailable(Some(Duration::from_secs(2)))),
            Duration::from_secs(2)
        );
        assert_eq!(policy.delay_for(0, &unavailable(None)), Duration::from_secs(10));
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn parse_retry_after_values() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 120 "), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_retry_after_before_next_attempt() {
        let policy = RetryPolicy::new().with_initial_backoff(Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        let result = policy
            .run(|_| {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(ExchangeError::RateLimited {
                            retry_after: Some(Duration::from_secs(2)),
                        })
                    } else {
                        Ok(start.elapsed())
                    }
                }
            })
            .await;

        let waited = result.unwrap();
        assert!(waited >= Duration::from_secs(2), "waited only {waited:?}");
        assert!(waited < Duration::from_secs(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_retry_after_on_server_error() {
        let policy = RetryPolicy::new().with_initial_backoff(Duration::from_millis(1));
        let start = Instant::now();

        let result = policy
            .run(|attempt| async move {
                if attempt == 0 {
                    Err(ExchangeError::UpstreamUnavailable {
                        status: 503,
                        detail: "maintenance".into(),
                        retry_after: Some(Duration::from_secs(2)),
                    })
                } else {
                    Ok(start.elapsed())
                }
            })
            .await;

        let waited = result.unwrap();
        assert!(waited >= Duration::from_secs(2), "waited only {waited:?}");
        assert!(waited < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn four_network_failures_exhaust_budget() {
        let policy = RetryPolicy::new();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: Result<(), _> = policy
            .run(|_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ExchangeError::Transport("connection refused".into()))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(ExchangeError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, ExchangeError::Transport(_)));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_request_is_not_retried() {
        let policy = RetryPolicy::new();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: Result<(), _> = policy
            .run(|_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ExchangeError::UpstreamRejected {
                        status: 400,
                        detail: "invalid_grant".into(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ExchangeError::UpstreamRejected { status: 400, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_server_errors() {
        let policy = RetryPolicy::new();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result = policy
            .run(|attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(ExchangeError::UpstreamUnavailable {
                            status: 503,
                            detail: String::new(),
                            retry_after: None,
                        })
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
