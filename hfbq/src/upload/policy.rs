use std::time::Duration;

use hfbq_config::shared::RetryConfig;

use crate::error::LoaderError;

/// Decides whether a failed load attempt is retried and how long to wait before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: u32,
    backoff_unit: Duration,
    retry_all_errors: bool,
}

impl RetryPolicy {
    /// Creates a policy retrying every error with the given attempt cap and backoff.
    ///
    /// An attempt cap of zero is raised to one.
    pub fn new(max_attempts: u32, backoff_base: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_unit,
            retry_all_errors: true,
        }
    }

    /// Only retries errors whose kind is transient.
    pub fn with_retry_all_errors(mut self, retry_all_errors: bool) -> Self {
        self.retry_all_errors = retry_all_errors;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` when `error` may be retried regardless of the attempt count.
    pub fn is_retryable(&self, error: &LoaderError) -> bool {
        self.retry_all_errors || error.kind().is_transient()
    }

    /// Returns `true` when failed attempt number `attempt` is followed by another one.
    pub fn should_retry(&self, attempt: u32, error: &LoaderError) -> bool {
        attempt < self.max_attempts && self.is_retryable(error)
    }

    /// Pause following failed attempt number `attempt`: `unit * base^attempt`.
    ///
    /// Saturates instead of overflowing for large attempt numbers.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(self.backoff_base.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.backoff_base,
            config.backoff_unit(),
        )
        .with_retry_all_errors(config.retry_all_errors)
    }
}
