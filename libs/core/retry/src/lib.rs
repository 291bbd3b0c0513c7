//! Retry/backoff utility shared by every stage that calls a downstream
//! service: classifies a failure as retryable or terminal, sleeps
//! `base * 2^attempt` capped by `max_delay`, and honors cancellation both
//! before each attempt and before each sleep.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Whether a failed attempt is worth retrying at all. Computed by the
/// caller's classifier, not inferred here — the precise boundary (which
/// HTTP statuses count as transient, which error variants are schema
/// errors) is stage-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Throttling, transient 5xx, connection error.
    Retryable,
    /// Schema errors, 4xx except 429.
    Terminal,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub use_jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            use_jitter: true,
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// `base * 2^attempt`, capped at `max_delay_ms`. `attempt` is 0-based
    /// (the delay before the *first* retry, i.e. after attempt 0 fails).
    fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let scaled = (self.base_delay_ms as f64) * 2f64.powi(attempt as i32);
        (scaled as u64).min(self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    /// Matches the ENRICHING/COSTING stage policy: up to 2 retries.
    fn default() -> Self {
        Self::new(2, 200, 5_000)
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("cancelled before completion")]
    Cancelled,
    #[error("terminal failure: {0}")]
    Terminal(E),
    #[error("retries exhausted: {0}")]
    Exhausted(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Cancelled => None,
            RetryError::Terminal(e) | RetryError::Exhausted(e) => Some(e),
        }
    }
}

/// Random jitter in `[50%, 100%]` of `delay`, following the same
/// time-seeded hash approach `database::common::retry` uses rather than
/// pulling in a dedicated RNG crate for one call site.
fn apply_jitter(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let random_factor =
        (RandomState::new().hash_one(std::time::Instant::now()) % 50) as f64 / 100.0 + 0.5;
    (delay as f64 * random_factor) as u64
}

/// Retry `operation` under `policy`, classifying each failure with
/// `classify` and cooperating with `cancel`. Cancellation is checked both
/// before each attempt and before each backoff sleep, so a cancelled
/// operation never starts a new attempt and never waits out a sleep it
/// was told to abandon.
pub async fn retry_with_cancellation<F, Fut, T, E>(
    mut operation: F,
    policy: RetryPolicy,
    cancel: &CancellationToken,
    classify: impl Fn(&E) -> Classification,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = operation() => result,
        };

        let err = match result {
            Ok(value) => {
                if attempt > 0 {
                    debug!("operation succeeded after {attempt} retries");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if classify(&err) == Classification::Terminal {
            warn!("operation failed with a terminal error: {err}");
            return Err(RetryError::Terminal(err));
        }

        if attempt >= policy.max_retries {
            warn!("operation exhausted {} retries: {err}", policy.max_retries);
            return Err(RetryError::Exhausted(err));
        }

        let delay = policy.delay_for_attempt(attempt);
        let delay = if policy.use_jitter {
            apply_jitter(delay)
        } else {
            delay
        };
        debug!(
            "retryable failure (attempt {}/{}): {err}. retrying in {delay}ms",
            attempt + 1,
            policy.max_retries
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
        }

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Flaky;
    impl std::fmt::Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky")
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let cancel = CancellationToken::new();
        let result: Result<&str, RetryError<Flaky>> = retry_with_cancellation(
            || async { Ok("ok") },
            RetryPolicy::default(),
            &cancel,
            |_| Classification::Retryable,
        )
        .await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();
        let policy = RetryPolicy::new(2, 1, 10).without_jitter();

        let result: Result<&str, RetryError<Flaky>> = retry_with_cancellation(
            move || {
                let counted = counted.clone();
                async move {
                    if counted.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Flaky)
                    } else {
                        Ok("ok")
                    }
                }
            },
            policy,
            &cancel,
            |_| Classification::Retryable,
        )
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_classification_aborts_immediately() {
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: Result<&str, RetryError<Flaky>> = retry_with_cancellation(
            move || {
                let counted = counted.clone();
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Err(Flaky)
                }
            },
            RetryPolicy::new(5, 1, 10).without_jitter(),
            &cancel,
            |_| Classification::Terminal,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Terminal(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausting_retries_returns_exhausted() {
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: Result<&str, RetryError<Flaky>> = retry_with_cancellation(
            move || {
                let counted = counted.clone();
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Err(Flaky)
                }
            },
            RetryPolicy::new(2, 1, 10).without_jitter(),
            &cancel,
            |_| Classification::Retryable,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_before_first_attempt_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: Result<&str, RetryError<Flaky>> = retry_with_cancellation(
            move || {
                let counted = counted.clone();
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Ok("should not run")
                }
            },
            RetryPolicy::default(),
            &cancel,
            |_| Classification::Retryable,
        )
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn delay_for_attempt_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 450).without_jitter();
        assert_eq!(policy.delay_for_attempt(0), 100);
        assert_eq!(policy.delay_for_attempt(1), 200);
        assert_eq!(policy.delay_for_attempt(2), 400);
        assert_eq!(policy.delay_for_attempt(3), 450);
    }
}
