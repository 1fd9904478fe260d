use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::shared::ValidationError;
use crate::shared::base::require_non_empty;

/// BigQuery destination configuration.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid accidentally
/// leaking the service account key into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    /// Google Cloud project that owns the dataset and is billed for the load job.
    pub project_id: String,
    /// BigQuery dataset identifier. The dataset must already exist.
    pub dataset_id: String,
    /// Destination table, created if missing and overwritten otherwise.
    pub table_id: String,
    /// BigQuery location of the dataset, e.g. `US` or `europe-west1`.
    pub location: String,
    /// Path of a service account key file.
    #[serde(default)]
    pub service_account_key_path: Option<String>,
    /// Inline service account key JSON. Takes precedence over the key path.
    #[serde(default)]
    pub service_account_key: Option<SecretString>,
    /// Base URL of the BigQuery REST API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Whether the dataset is checked for existence and location before loading.
    #[serde(default = "default_validate_destination")]
    pub validate_destination: bool,
    /// Interval between two load job status polls, in milliseconds.
    #[serde(default = "default_job_poll_interval_ms")]
    pub job_poll_interval_ms: u64,
    /// Timeout applied to each HTTP request against BigQuery, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Where the service account key is read from.
#[derive(Debug, Clone)]
pub enum ServiceAccountKeySource<'a> {
    /// Inline key JSON.
    Inline(&'a SecretString),
    /// Key file on disk.
    Path(&'a str),
}

impl DestinationConfig {
    /// Public BigQuery REST endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://bigquery.googleapis.com";

    /// Default interval between load job polls.
    pub const DEFAULT_JOB_POLL_INTERVAL_MS: u64 = 1_000;

    /// Default per-request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 300_000;

    /// Returns the configured key source, preferring the inline key.
    pub fn service_account_key_source(&self) -> Option<ServiceAccountKeySource<'_>> {
        if let Some(key) = &self.service_account_key {
            return Some(ServiceAccountKeySource::Inline(key));
        }

        self.service_account_key_path
            .as_deref()
            .map(ServiceAccountKeySource::Path)
    }

    /// Returns the load job poll interval.
    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }

    /// Returns the HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the destination settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("destination.project_id", &self.project_id)?;
        require_non_empty("destination.dataset_id", &self.dataset_id)?;
        require_non_empty("destination.table_id", &self.table_id)?;
        require_non_empty("destination.location", &self.location)?;
        require_non_empty("destination.endpoint", &self.endpoint)?;

        if self.job_poll_interval_ms == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "destination.job_poll_interval_ms".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        if self.request_timeout_ms == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "destination.request_timeout_ms".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }

        if self.service_account_key_source().is_none() {
            return Err(ValidationError::MissingCredentials);
        }

        Ok(())
    }
}

fn default_endpoint() -> String {
    DestinationConfig::DEFAULT_ENDPOINT.to_string()
}

const fn default_validate_destination() -> bool {
    true
}

const fn default_job_poll_interval_ms() -> u64 {
    DestinationConfig::DEFAULT_JOB_POLL_INTERVAL_MS
}

const fn default_request_timeout_ms() -> u64 {
    DestinationConfig::DEFAULT_REQUEST_TIMEOUT_MS
}
