use serde::Deserialize;

use crate::shared::{DestinationConfig, RetryConfig, SourceConfig, ValidationError};

/// Complete configuration of one loader run.
///
/// Built once at start-up and passed by reference to every component. Typically loaded with
/// [`crate::load_config`].
///
/// This intentionally does not implement [`serde::Serialize`] to avoid accidentally
/// leaking secrets in the config into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Dataset hub source.
    pub source: SourceConfig,
    /// BigQuery destination.
    pub destination: DestinationConfig,
    /// Upload retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl LoaderConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()?;
        self.retry.validate()
    }
}
