use std::path::PathBuf;

use clap::Parser;
use hfbq_config::shared::LoaderConfig;
use hfbq_config::{Environment, load_config, load_config_from};

use crate::error::{LoaderCliError, LoaderCliResult};

/// Command line arguments.
///
/// Every argument overrides the corresponding value of the loaded configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Loads a Hugging Face dataset split into a BigQuery table", long_about = None)]
pub struct Args {
    /// Directory holding `base.yaml` and the per-environment files.
    ///
    /// Defaults to `./configuration`.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Hub dataset to fetch, e.g. `stanfordnlp/imdb`.
    #[arg(long)]
    pub dataset: Option<String>,

    /// Split to fetch.
    #[arg(long)]
    pub split: Option<String>,

    /// Dataset config (subset) holding the split.
    #[arg(long)]
    pub config_name: Option<String>,

    /// Destination table name.
    #[arg(long)]
    pub table: Option<String>,

    /// Maximum number of upload attempts.
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

impl Args {
    /// Applies the command line overrides to `config`.
    pub fn apply_overrides(&self, config: &mut LoaderConfig) {
        if let Some(dataset) = &self.dataset {
            config.source.dataset_id = dataset.clone();
        }
        if let Some(split) = &self.split {
            config.source.split = split.clone();
        }
        if let Some(config_name) = &self.config_name {
            config.source.config_name = Some(config_name.clone());
        }
        if let Some(table) = &self.table {
            config.destination.table_id = table.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
    }
}

/// Loads the configuration, applies command line overrides, and validates the result.
pub fn load_loader_config(args: &Args) -> LoaderCliResult<LoaderConfig> {
    let mut config = match &args.config_dir {
        Some(config_dir) => {
            let environment = Environment::load()?;
            load_config_from::<LoaderConfig>(config_dir, environment)
        }
        None => load_config::<LoaderConfig>(),
    }
    .map_err(LoaderCliError::config)?;

    args.apply_overrides(&mut config);
    config.validate().map_err(LoaderCliError::config)?;

    Ok(config)
}
