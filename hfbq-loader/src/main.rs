//! Hugging Face to BigQuery loader binary.
//!
//! Loads the configuration, initializes tracing, and runs the load pipeline once on a
//! single-threaded runtime. Exits with a non-zero status and a rendered report on failure.

use std::process::ExitCode;

use clap::Parser;
use hfbq_config::shared::LoaderConfig;
use hfbq_telemetry::tracing::init_tracing;
use tracing::error;

use crate::config::{Args, load_loader_config};
use crate::core::start_loader_with_config;
use crate::error::{LoaderCliError, LoaderCliResult};

mod config;
mod core;
mod error;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err.render_report());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> LoaderCliResult<()> {
    let loader_config = load_loader_config(args)?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME")).map_err(LoaderCliError::config)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(loader_config))
}

async fn async_main(loader_config: LoaderConfig) -> LoaderCliResult<()> {
    if let Err(err) = start_loader_with_config(loader_config).await {
        error!("{err}");
        return Err(err);
    }

    Ok(())
}
