//! Retry policy for transient provider failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::FetchError;

/// Wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`. With `jitter`, the result
    /// is scaled by a random factor in `[0.5, 1.5)` so workers that failed
    /// together do not retry together.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let capped = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(capped.max(0.0));
                if jitter {
                    delay.mul_f64(0.5 + fastrand::f64())
                } else {
                    delay
                }
            }
        }
    }
}

/// Scan-level retry policy.
///
/// Only errors whose [`FetchError::retryable`] is set are retried; an
/// unknown ticker fails on the first attempt regardless of the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Exponential backoff with jitter.
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::default(),
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            backoff: Backoff::default(),
        }
    }

    /// Whether a failure on attempt `attempt` (0-based) deserves another try.
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries && error.retryable()
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Run `operation` until it succeeds, fails terminally, or the budget
    /// is spent. Returns the last error.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if self.should_retry(&error, attempt) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        symbol = %error.symbol(),
                        code = error.code(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying transient fetch failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceError;
    use crate::Symbol;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn provider_error(source: SourceError) -> FetchError {
        let symbol = Symbol::parse("PETR4.SA").expect("valid symbol");
        FetchError::from_source(&symbol, source)
    }

    #[test]
    fn fixed_backoff_ignores_attempt() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };

        assert_eq!(backoff.delay(0), backoff.delay(7));
    }

    #[test]
    fn exponential_backoff_doubles_until_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        };

        let delays: Vec<u128> = (0..5).map(|a| backoff.delay(a).as_millis()).collect();
        assert_eq!(delays, [100, 200, 400, 800, 1000]);
    }

    #[test]
    fn jitter_stays_within_half_either_side() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 1.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay(3);
            assert!(delay >= Duration::from_millis(100), "{delay:?}");
            assert!(delay < Duration::from_millis(300), "{delay:?}");
        }
    }

    #[test]
    fn default_policy_does_not_retry() {
        let config = RetryConfig::default();
        let transient = provider_error(SourceError::timeout("slow"));

        assert!(!config.enabled);
        assert!(!config.should_retry(&transient, 0));
    }

    #[test]
    fn only_retryable_errors_within_budget_are_retried() {
        let config = RetryConfig::fixed(Duration::from_millis(1), 2);
        let transient = provider_error(SourceError::rate_limited("429"));
        let missing = provider_error(SourceError::not_found("404"));

        assert!(config.should_retry(&transient, 0));
        assert!(config.should_retry(&transient, 1));
        assert!(!config.should_retry(&transient, 2));
        assert!(!config.should_retry(&missing, 0));
    }

    #[tokio::test]
    async fn run_stops_after_success() {
        let config = RetryConfig::fixed(Duration::from_millis(1), 3);
        let attempts = &AtomicU32::new(0);

        let value = config
            .run(|| async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(provider_error(SourceError::unavailable("502")))
                } else {
                    Ok(7)
                }
            })
            .await
            .expect("third attempt succeeds");

        assert_eq!(value, 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn run_gives_up_on_terminal_errors() {
        let config = RetryConfig::fixed(Duration::from_millis(1), 3);
        let attempts = &AtomicU32::new(0);

        let result: Result<(), _> = config
            .run(|| async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(provider_error(SourceError::not_found("404")))
            })
            .await;

        assert!(matches!(result, Err(FetchError::NotFound { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
