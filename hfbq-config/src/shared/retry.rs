use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Retry behavior of the load job upload.
///
/// Attempt `n` that fails (with `n < max_attempts`) is followed by a pause of
/// `backoff_unit_ms * backoff_base^n` milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of load attempts, including the first one.
    ///
    /// Default: 5
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff.
    ///
    /// Default: 2
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u32,

    /// Length of one backoff unit in milliseconds.
    ///
    /// Default: 1000 (one second)
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Whether every load error is retried.
    ///
    /// When disabled, errors classified as permanent (authentication, permissions, invalid
    /// requests, missing dataset) abort the upload on the first occurrence.
    /// Default: true
    #[serde(default = "default_retry_all_errors")]
    pub retry_all_errors: bool,
}

impl RetryConfig {
    /// Default maximum number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Default backoff base.
    pub const DEFAULT_BACKOFF_BASE: u32 = 2;

    /// Default backoff unit in milliseconds.
    pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 1_000;

    /// Returns the backoff unit as a [`Duration`].
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// Validates retry settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "retry.max_attempts".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        if self.backoff_base == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "retry.backoff_base".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            backoff_unit_ms: default_backoff_unit_ms(),
            retry_all_errors: default_retry_all_errors(),
        }
    }
}

const fn default_max_attempts() -> u32 {
    RetryConfig::DEFAULT_MAX_ATTEMPTS
}

const fn default_backoff_base() -> u32 {
    RetryConfig::DEFAULT_BACKOFF_BASE
}

const fn default_backoff_unit_ms() -> u64 {
    RetryConfig::DEFAULT_BACKOFF_UNIT_MS
}

const fn default_retry_all_errors() -> bool {
    true
}
