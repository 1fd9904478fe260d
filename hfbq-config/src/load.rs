use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory holding the configuration files, relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Extensions tried, in order, for every configuration layer.
const CONFIG_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Prefix of environment variable overrides (`APP_...`).
const ENV_PREFIX: &str = "APP";

/// Separator between nested keys of an override (`APP_RETRY__MAX_ATTEMPTS`).
const ENV_SEPARATOR: &str = "__";

/// Errors raised while loading the layered configuration.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("configuration directory `{0}` does not exist")]
    MissingConfigurationDirectory(PathBuf),

    /// None of the supported extensions exists for a layer.
    #[error("no {layer} file in `{directory}`; attempted: {attempted}")]
    ConfigurationFileMissing {
        layer: String,
        directory: PathBuf,
        attempted: String,
    },

    /// A layer exists but is not valid YAML or JSON.
    #[error("failed to parse {layer} file `{path}`: {source}")]
    ConfigurationFileLoad {
        layer: String,
        path: PathBuf,
        source: config::ConfigError,
    },

    /// Merging the layers and the environment overrides failed.
    #[error("failed to build configuration: {0}")]
    Builder(#[source] config::ConfigError),

    #[error("failed to deserialize configuration: {0}")]
    Deserialization(#[source] config::ConfigError),

    /// `APP_ENVIRONMENT` holds an unsupported value.
    #[error("failed to determine runtime environment: {0}")]
    Environment(#[source] io::Error),
}

/// Loads configuration from `./configuration` for the environment selected by `APP_ENVIRONMENT`.
///
/// Layers, later ones winning: `base.(yaml|yml|json)`, `{environment}.(yaml|yml|json)`, then
/// `APP_`-prefixed environment variables with `__` between nested keys
/// (`APP_DESTINATION__TABLE_ID=imdb`). Override values are parsed, so numbers and booleans
/// such as `APP_RETRY__MAX_ATTEMPTS=3` reach numeric and boolean fields.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    let working_dir = std::env::current_dir().map_err(LoadConfigError::CurrentDir)?;
    let environment = Environment::load().map_err(LoadConfigError::Environment)?;

    load_config_from(&working_dir.join(CONFIGURATION_DIR), environment)
}

/// Loads configuration from an explicit directory and environment.
///
/// Same layering as [`load_config`], environment variable overrides included.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    if !directory.is_dir() {
        return Err(LoadConfigError::MissingConfigurationDirectory(
            directory.to_path_buf(),
        ));
    }

    let layers = [
        ("base configuration".to_string(), "base"),
        (
            format!("{environment} environment configuration"),
            environment.as_str(),
        ),
    ];

    let mut builder = config::Config::builder();
    for (layer, stem) in layers {
        let path = locate_layer(directory, stem, &layer)?;
        builder = builder.add_source(config::File::from(path.clone()));

        // Build each prefix so a parse failure names the offending file.
        if let Err(source) = builder.build_cloned() {
            return Err(LoadConfigError::ConfigurationFileLoad {
                layer,
                path,
                source,
            });
        }
    }

    let overrides = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true);

    builder
        .add_source(overrides)
        .build()
        .map_err(LoadConfigError::Builder)?
        .try_deserialize::<T>()
        .map_err(LoadConfigError::Deserialization)
}

/// Returns the first existing `{stem}.{extension}` file in `directory`.
fn locate_layer(directory: &Path, stem: &str, layer: &str) -> Result<PathBuf, LoadConfigError> {
    let candidates: Vec<PathBuf> = CONFIG_FILE_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{stem}.{extension}")))
        .collect();

    if let Some(path) = candidates.iter().find(|path| path.is_file()) {
        return Ok(path.clone());
    }

    Err(LoadConfigError::ConfigurationFileMissing {
        layer: layer.to_string(),
        directory: directory.to_path_buf(),
        attempted: candidates
            .iter()
            .map(|path| format!("`{}`", path.display()))
            .collect::<Vec<_>>()
            .join(", "),
    })
}
