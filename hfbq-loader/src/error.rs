use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

use hfbq::error::LoaderError;

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for the loader binary.
pub type LoaderCliResult<T> = Result<T, LoaderCliError>;

/// Captured backtrace of an error raised outside the library.
pub struct CapturedBacktrace(Backtrace);

impl CapturedBacktrace {
    fn capture() -> Self {
        Self(Backtrace::capture())
    }
}

impl fmt::Debug for CapturedBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type of the loader binary.
///
/// Wraps [`LoaderError`] for pipeline failures and adds variants for start-up failures.
#[derive(Debug)]
pub enum LoaderCliError {
    /// Fetch, validation, or upload error.
    Loader(LoaderError),
    /// Configuration could not be loaded or is invalid.
    Config(Box<dyn Error + Send + Sync>, CapturedBacktrace),
    /// I/O error, e.g. while building the runtime.
    Io(std::io::Error, CapturedBacktrace),
}

impl LoaderCliError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            LoaderCliError::Loader(err) if err.kind().is_fetch_error() => "fetch error",
            LoaderCliError::Loader(_) => "load error",
            LoaderCliError::Config(_, _) => "configuration error",
            LoaderCliError::Io(_, _) => "i/o error",
        }
    }

    /// Returns the backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        match self {
            LoaderCliError::Loader(err) => err.backtrace(),
            LoaderCliError::Config(_, cb) | LoaderCliError::Io(_, cb) => &cb.0,
        }
    }

    /// Creates a configuration error from any error.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        LoaderCliError::Config(Box::new(err), CapturedBacktrace::capture())
    }

    /// Returns a user-oriented report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("hf-bigquery-loader failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        if should_render_backtrace() {
            let backtrace = self.backtrace().to_string();
            if !backtrace.trim().is_empty() {
                out.push_str("backtrace:\n");
                out.push_str(&backtrace);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }

        out
    }
}

impl fmt::Display for LoaderCliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderCliError::Loader(err) => write!(f, "{err}"),
            LoaderCliError::Config(source, _) => write!(f, "configuration error: {source}"),
            LoaderCliError::Io(source, _) => write!(f, "i/o error: {source}"),
        }
    }
}

impl Error for LoaderCliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoaderCliError::Loader(err) => err.source(),
            LoaderCliError::Config(source, _) => Some(source.as_ref()),
            LoaderCliError::Io(source, _) => Some(source),
        }
    }
}

impl From<std::io::Error> for LoaderCliError {
    fn from(err: std::io::Error) -> Self {
        LoaderCliError::Io(err, CapturedBacktrace::capture())
    }
}

impl From<LoaderError> for LoaderCliError {
    fn from(err: LoaderError) -> Self {
        LoaderCliError::Loader(err)
    }
}
