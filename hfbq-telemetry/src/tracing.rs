//! Tracing subscriber setup.
//!
//! Logs go to standard output through a non-blocking writer. In the `dev` environment the
//! output is human readable, in `prod` it is one JSON object per line. The filter is read from
//! `RUST_LOG` and defaults to `info`.

use std::sync::Once;

use hfbq_config::Environment;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to determine the runtime environment: {0}")]
    Environment(#[from] std::io::Error),
    #[error("failed to install the global tracing subscriber: {0}")]
    SetGlobalDefault(#[from] ::tracing::subscriber::SetGlobalDefaultError),
    #[error("failed to install the log compatibility bridge: {0}")]
    LogTracer(#[from] tracing_log::log_tracer::SetLoggerError),
}

/// Flushes buffered log lines when dropped.
///
/// Keep it alive for the whole lifetime of `main`, otherwise trailing log lines are lost.
#[must_use = "dropping the flusher stops log output"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs the global subscriber for `app_name`, picking the format from `APP_ENVIRONMENT`.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    let environment = Environment::load()?;

    init_tracing_for_environment(app_name, environment)
}

/// Installs the global subscriber for an explicit environment.
pub fn init_tracing_for_environment(
    app_name: &str,
    environment: Environment,
) -> Result<LogFlusher, TracingError> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if environment.is_prod() {
        let subscriber = Registry::default().with(filter).with(
            fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(writer),
        );
        ::tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(writer));
        ::tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing_log::LogTracer::init()?;

    ::tracing::debug!(app = app_name, %environment, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a test subscriber once per process when `ENABLE_TRACING` is set.
///
/// Output goes through the test writer so it is captured per test.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        if std::env::var_os("ENABLE_TRACING").is_none() {
            return;
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
