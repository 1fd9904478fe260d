use secrecy::SecretString;
use serde::Deserialize;

use crate::shared::ValidationError;
use crate::shared::base::require_non_empty;

/// Configuration of the dataset hub the snapshot is fetched from.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid leaking the hub token.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Hub dataset identifier, e.g. `stanfordnlp/imdb`.
    pub dataset_id: String,
    /// Split to fetch.
    #[serde(default = "default_split")]
    pub split: String,
    /// Dataset config (subset) holding the split.
    ///
    /// When `None`, the first config exposing [`SourceConfig::split`] is used.
    #[serde(default)]
    pub config_name: Option<String>,
    /// Base URL of the dataset viewer API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Number of rows requested per page, between 1 and [`SourceConfig::MAX_PAGE_SIZE`].
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Access token for gated or private datasets.
    #[serde(default)]
    pub token: Option<SecretString>,
}

impl SourceConfig {
    /// Split fetched when none is configured.
    pub const DEFAULT_SPLIT: &'static str = "train";

    /// Public dataset viewer endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://datasets-server.huggingface.co";

    /// Largest page the dataset viewer serves.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Creates a source for `dataset_id` with every other field defaulted.
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            split: default_split(),
            config_name: None,
            endpoint: default_endpoint(),
            page_size: default_page_size(),
            token: None,
        }
    }

    /// Validates the source settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("source.dataset_id", &self.dataset_id)?;
        require_non_empty("source.split", &self.split)?;
        require_non_empty("source.endpoint", &self.endpoint)?;

        if let Some(config_name) = &self.config_name {
            require_non_empty("source.config_name", config_name)?;
        }

        if self.page_size == 0 || self.page_size > Self::MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidFieldValue {
                field: "source.page_size".to_string(),
                constraint: format!("must be between 1 and {}", Self::MAX_PAGE_SIZE),
            });
        }

        Ok(())
    }
}

fn default_split() -> String {
    SourceConfig::DEFAULT_SPLIT.to_string()
}

fn default_endpoint() -> String {
    SourceConfig::DEFAULT_ENDPOINT.to_string()
}

const fn default_page_size() -> u32 {
    SourceConfig::MAX_PAGE_SIZE
}
