use thiserror::Error;

/// Errors raised when a loaded configuration is structurally valid but semantically wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field is empty.
    #[error("`{field}` must not be empty")]
    EmptyField { field: String },
    /// A field holds a value outside of its accepted range.
    #[error("invalid value for `{field}`: {constraint}")]
    InvalidFieldValue { field: String, constraint: String },
    /// Neither a service account key nor a key path was configured.
    #[error(
        "missing BigQuery credentials: set `destination.service_account_key_path` or `destination.service_account_key`"
    )]
    MissingCredentials,
}

/// Returns [`ValidationError::EmptyField`] when `value` is empty.
///
/// Other malformed values are left to the services that consume them.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }

    Ok(())
}
