//! Retry budget and backoff schedule for upstream calls.

use std::time::Duration;

/// Retry policy applied by the data source client.
///
/// The wait after the n-th failed attempt (1-based) is `n * step`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, first call included.
    pub budget: u32,
    /// Increment added to the wait per failed attempt.
    pub step: Duration,
    /// HTTP status codes treated as transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            budget: 5,
            step: Duration::from_secs(60),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Linear backoff with the given budget and step.
    pub fn linear(budget: u32, step: Duration) -> Self {
        Self {
            budget,
            step,
            ..Self::default()
        }
    }

    /// Check if a given HTTP status code should trigger a retry.
    ///
    /// Every 5xx counts as transient even when not listed.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status) || (500..600).contains(&status)
    }

    /// Calculate the delay after a given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt.max(1))
    }
}
