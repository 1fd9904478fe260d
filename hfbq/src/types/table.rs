use std::fmt;

use crate::bail;
use crate::error::{ErrorKind, LoaderResult};

/// Fully-qualified BigQuery table identifier.
///
/// Rendered as `project.dataset.table`. All three components are non-empty and the identifier
/// cannot be changed once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationTableId {
    project_id: String,
    dataset_id: String,
    table_id: String,
}

impl DestinationTableId {
    /// Builds an identifier, rejecting empty components.
    ///
    /// No other validation happens here, BigQuery rejects malformed names when the load job is
    /// submitted.
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> LoaderResult<Self> {
        let project_id = project_id.into();
        let dataset_id = dataset_id.into();
        let table_id = table_id.into();

        for (name, value) in [
            ("project_id", &project_id),
            ("dataset_id", &dataset_id),
            ("table_id", &table_id),
        ] {
            if value.is_empty() {
                bail!(
                    ErrorKind::ConfigError,
                    "Destination table identifier component is empty",
                    format!("`{name}` must not be empty")
                );
            }
        }

        Ok(Self {
            project_id,
            dataset_id,
            table_id,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }
}

impl fmt::Display for DestinationTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}
