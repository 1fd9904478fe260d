//! Error types and result definitions for loader operations.
//!
//! Every fallible operation of the crate returns a [`LoaderError`]: an [`ErrorKind`] used for
//! classification, a static description, optional dynamic detail, an optional source error, and
//! the call site where the error was created.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Specific categories of errors that can occur while loading a dataset.
///
/// Kinds are grouped by the component that produces them. The `Source*` kinds are fetch errors
/// and never enter the upload retry loop.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Configuration & Data Errors
    ConfigError,
    InvalidData,

    // Source (Dataset Hub) Errors
    SourceConnectionFailed,
    SourceAuthenticationError,
    SourceDatasetNotFound,
    SourceSplitNotFound,
    SourceRequestFailed,
    SourceResponseInvalid,

    // Destination (Warehouse) Errors
    DestinationConnectionFailed,
    DestinationAuthenticationError,
    DestinationPermissionDenied,
    DestinationNotFound,
    DestinationNamespaceMissing,
    DestinationRequestInvalid,
    DestinationResponseInvalid,
    LoadJobFailed,

    // Retry Errors
    RetriesExhausted,

    // IO & Serialization Errors
    IoError,
    SerializationError,
    DeserializationError,

    // Unknown / Uncategorized
    Unknown,
}

impl ErrorKind {
    /// Returns `true` for errors raised while fetching the source dataset.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::SourceConnectionFailed
                | ErrorKind::SourceAuthenticationError
                | ErrorKind::SourceDatasetNotFound
                | ErrorKind::SourceSplitNotFound
                | ErrorKind::SourceRequestFailed
                | ErrorKind::SourceResponseInvalid
        )
    }

    /// Returns `true` for errors that are expected to recover without operator intervention.
    ///
    /// Keep this list narrow: connectivity, capacity, and backend failures of a load job.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::SourceConnectionFailed
                | ErrorKind::DestinationConnectionFailed
                | ErrorKind::DestinationResponseInvalid
                | ErrorKind::LoadJobFailed
                | ErrorKind::IoError
                | ErrorKind::Unknown
        )
    }
}

/// Main error type of the crate.
#[derive(Debug, Clone)]
pub struct LoaderError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

impl LoaderError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the dynamic detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace.
    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    /// Attaches an originating error, exposed through [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        LoaderError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl PartialEq for LoaderError {
    fn eq(&self, other: &LoaderError) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            write_block("Detail", detail, f)?;
        }

        let backtrace = self.backtrace.to_string();
        if !backtrace.trim().is_empty() {
            write_block("Backtrace", &backtrace, f)?;
        }

        Ok(())
    }
}

impl error::Error for LoaderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Writes an indented, titled block of lines.
fn write_block(title: &str, body: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if body.trim().is_empty() {
        return write!(f, "\n  {title}: <empty>");
    }

    write!(f, "\n  {title}:")?;
    for line in body.lines() {
        if line.trim().is_empty() {
            write!(f, "\n    ")?;
        } else {
            write!(f, "\n    {line}")?;
        }
    }

    Ok(())
}

/// Creates a [`LoaderError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for LoaderError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> LoaderError {
        LoaderError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`LoaderError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for LoaderError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> LoaderError {
        LoaderError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`std::io::Error`] to [`LoaderError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for LoaderError {
    #[track_caller]
    fn from(err: std::io::Error) -> LoaderError {
        let detail = err.to_string();
        LoaderError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`serde_json::Error`] to [`LoaderError`].
///
/// I/O failures map to [`ErrorKind::IoError`], everything else to
/// [`ErrorKind::DeserializationError`] or [`ErrorKind::SerializationError`] depending on
/// whether the error carries an input position.
impl From<serde_json::Error> for LoaderError {
    #[track_caller]
    fn from(err: serde_json::Error) -> LoaderError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
            serde_json::error::Category::Data if err.line() == 0 => {
                (ErrorKind::SerializationError, "JSON serialization failed")
            }
            serde_json::error::Category::Data => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        let detail = err.to_string();
        LoaderError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
