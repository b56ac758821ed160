//! Bounded retry with exponential backoff.
//!
//! Used for calls to the reasoning backend. Each retry waits
//! `initial_delay * base^(attempt - 1)` (capped at `max_delay`, optionally
//! jittered) and the whole sequence can be aborted through a
//! [`CancellationToken`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps the exponential growth).
    pub max_delay: Duration,
    /// Base for exponential backoff (typically 2.0).
    pub exponential_base: f64,
    /// Optional jitter factor (0.0 to 1.0) to randomize delays.
    #[serde(default)]
    pub jitter_factor: f64,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        exponential_base: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            exponential_base,
            jitter_factor: 0.0,
        }
    }

    /// Creates a configuration suitable for quick local operations and tests.
    #[must_use]
    pub fn fast() -> Self {
        Self::new(
            3,
            Duration::from_millis(10),
            Duration::from_millis(100),
            2.0,
        )
    }

    /// Creates a configuration suitable for reasoning backend calls.
    #[must_use]
    pub fn api() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            exponential_base: 2.0,
            jitter_factor: 0.2,
        }
    }

    /// Sets the jitter factor and returns self for builder-style configuration.
    #[must_use]
    pub const fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_factor = factor;
        self
    }

    /// Calculates the delay for a given attempt number (0-indexed).
    ///
    /// Returns `Duration::ZERO` for attempt 0, then exponentially increasing
    /// delays for subsequent attempts, capped at `max_delay`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_delay_ms =
            self.initial_delay.as_millis() as f64 * self.exponential_base.powi(exponent);

        let capped_delay_ms = base_delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_delay_ms.max(0.0) as u64)
    }

    /// Calculates the delay for a given attempt with jitter applied.
    ///
    /// `random_factor` is clamped to `0.0..=1.0`; the result lies in
    /// `[delay * (1 - jitter), delay * (1 + jitter)]`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn delay_for_attempt_with_jitter(&self, attempt: u32, random_factor: f64) -> Duration {
        let base_delay = self.delay_for_attempt(attempt);

        if self.jitter_factor <= 0.0 {
            return base_delay;
        }

        let random_factor = random_factor.clamp(0.0, 1.0);
        let jitter_multiplier =
            1.0 - self.jitter_factor + (2.0 * self.jitter_factor * random_factor);

        let jittered_ms = base_delay.as_millis() as f64 * jitter_multiplier;

        Duration::from_millis(jittered_ms.max(0.0) as u64)
    }

    /// Returns true if more attempts are allowed given the current attempt count.
    #[must_use]
    pub fn should_retry(&self, current_attempt: u32) -> bool {
        current_attempt < self.max_attempts
    }

}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::api()
    }
}

/// Result of a retry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed after all retry attempts, or with a non-retryable error.
    Exhausted {
        /// The final error.
        error: E,
        /// Total number of attempts made.
        attempts: u32,
    },
    /// Operation was aborted before completion (cancellation token fired).
    Aborted,
}

/// Execute an async operation with retry and exponential backoff.
///
/// The `should_retry` predicate receives the error and decides whether to
/// retry. Return `false` to stop early on non-retryable errors. Every
/// attempt and every backoff sleep is raced against `cancel`;
/// [`RetryOutcome::Aborted`] is returned as soon as the token fires.
///
/// # Example
///
/// ```rust,no_run
/// use switchboard_core::retry::{RetryConfig, retry_with_cancel};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let config = RetryConfig::api();
/// let cancel = CancellationToken::new();
/// let outcome = retry_with_cancel(&config, &cancel, |attempt| async move {
///     Ok::<_, String>(format!("done on attempt {attempt}"))
/// }, |_err| true).await;
/// # }
/// ```
pub async fn retry_with_cancel<T, E, Fut, F, P>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
    should_retry: P,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return RetryOutcome::Aborted,
            result = operation(attempt) => result,
        };

        match result {
            Ok(value) => return RetryOutcome::Success(value),
            Err(error) => {
                if !config.should_retry(attempt) || !should_retry(&error) {
                    return RetryOutcome::Exhausted {
                        error,
                        attempts: attempt.saturating_add(1),
                    };
                }

                attempt = attempt.saturating_add(1);
                let delay = config.delay_for_attempt_with_jitter(attempt, rand::random::<f64>());

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return RetryOutcome::Aborted,
                    () = tokio::time::sleep(delay) => {},
                }
            },
        }
    }
}
