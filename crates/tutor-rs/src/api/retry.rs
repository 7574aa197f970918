//! Automatic retry with exponential backoff.
//!
//! Retries [`FailureKind::RateLimited`](crate::FailureKind::RateLimited) and
//! [`FailureKind::ServerUnavailable`](crate::FailureKind::ServerUnavailable)
//! failures. Content rejections and unknown failures propagate on first
//! occurrence. The backoff sleep is a Tokio timer, so other tasks keep running.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::GenerationError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries (0 = a single attempt).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 for exponential backoff).
    pub multiplier: f64,
    /// Whether to shave a deterministic fraction off each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of retries. Uses defaults otherwise.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::with_retries(0)
    }

    /// Set the base delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64()
            * self.multiplier.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        let capped = base.min(self.max_delay.as_secs_f64());

        if self.jitter {
            // Deterministic jitter keyed on the attempt number.
            let jitter_factor = match attempt % 4 {
                0 => 0.75,
                1 => 0.90,
                2 => 0.60,
                _ => 0.85,
            };
            Duration::from_secs_f64(capped * jitter_factor)
        } else {
            Duration::from_secs_f64(capped)
        }
    }
}

/// Bookkeeping for one retried call. Lives for the duration of [`with_retry`].
#[derive(Debug, Default)]
pub struct RetryState {
    /// Attempts made so far that failed (0..=max_retries).
    pub attempt: u32,
    /// Delay chosen before the next attempt.
    pub delay: Duration,
}

/// Run `operation`, retrying retryable failures with exponential backoff.
///
/// Makes at most `max_retries + 1` attempts. Waits
/// `initial_delay * multiplier^attempt` before each retry.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut state = RetryState::default();
    loop {
        match operation().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }
                if state.attempt >= config.max_retries {
                    if state.attempt > 0 {
                        warn!("Giving up after {} attempts: {e}", state.attempt + 1);
                    }
                    return Err(e);
                }
                state.delay = config.delay_for_attempt(state.attempt);
                warn!(
                    "Retryable error (attempt {}/{}): {e}. Retrying in {:?}...",
                    state.attempt + 1,
                    config.max_retries,
                    state.delay,
                );
                tokio::time::sleep(state.delay).await;
                state.attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_config_three_retries() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(2000));
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let config = RetryConfig::default().with_initial_delay(Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(8000));
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(2),
            ..RetryConfig::with_retries(10)
        };
        assert!(config.delay_for_attempt(10) <= Duration::from_secs(2));
    }

    #[test]
    fn jitter_reduces_delay() {
        let jittered = RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        };
        let plain = RetryConfig::default();
        assert!(jittered.delay_for_attempt(2) < plain.delay_for_attempt(2));
    }

    fn fail(kind: FailureKind) -> GenerationError {
        GenerationError::new(kind, "scripted")
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_k_unavailable_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryConfig::with_retries(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(fail(FailureKind::ServerUnavailable))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_is_attempted_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::with_retries(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(fail(FailureKind::ContentRejected)) }
        })
        .await;
        assert_eq!(result.unwrap_err().kind, FailureKind::ContentRejected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_is_not_retried() {
        let calls = AtomicU32::new(0);
        let _ = with_retry(&RetryConfig::with_retries(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(fail(FailureKind::Unknown)) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_makes_max_retries_plus_one_attempts() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result: Result<(), _> = with_retry(&RetryConfig::with_retries(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(fail(FailureKind::RateLimited)) }
        })
        .await;
        assert_eq!(result.unwrap_err().kind, FailureKind::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 2s + 4s + 8s of backoff.
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(14) && waited < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_final_attempt_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::with_retries(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(GenerationError::new(
                    FailureKind::ServerUnavailable,
                    format!("attempt {n}"),
                ))
            }
        })
        .await;
        assert_eq!(result.unwrap_err().message, "attempt 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryConfig::none(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(fail(FailureKind::ServerUnavailable)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
