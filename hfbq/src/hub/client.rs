use hfbq_config::shared::SourceConfig;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, LoaderError, LoaderResult};
use crate::hub::base::DatasetHub;
use crate::hub::model::{RowsPage, SplitsResponse};
use crate::types::{ColumnSchema, TabularSnapshot};
use crate::{bail, loader_error};

/// Client of the Hugging Face dataset viewer API.
///
/// Splits are read page by page through `GET /rows`, so datasets are fetched without
/// downloading their parquet files. When no config name is configured, the first config that
/// exposes the requested split is used.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    endpoint: String,
    page_size: u32,
    config_name: Option<String>,
    token: Option<SecretString>,
}

impl HubClient {
    /// Creates a client from the source section of the configuration.
    pub fn new(config: &SourceConfig) -> LoaderResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hf-bigquery-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| {
                loader_error!(
                    ErrorKind::ConfigError,
                    "Failed to build the dataset hub HTTP client",
                    err.to_string(),
                    source: err
                )
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            config_name: config.config_name.clone(),
            token: config.token.clone(),
        })
    }

    /// Returns the dataset config holding `split`.
    async fn resolve_config_name(&self, dataset_id: &str, split: &str) -> LoaderResult<String> {
        if let Some(config_name) = &self.config_name {
            return Ok(config_name.clone());
        }

        let request = self
            .http
            .get(format!("{}/splits", self.endpoint))
            .query(&[("dataset", dataset_id)]);
        let response: SplitsResponse = self.send(request).await?;

        let Some(entry) = response.splits.into_iter().find(|entry| entry.split == split) else {
            bail!(
                ErrorKind::SourceSplitNotFound,
                "Split not found in the dataset",
                format!("dataset `{dataset_id}` has no split named `{split}`")
            );
        };

        info!(dataset_id, split, config = %entry.config, "resolved dataset config");

        Ok(entry.config)
    }

    async fn fetch_page(
        &self,
        dataset_id: &str,
        config_name: &str,
        split: &str,
        offset: u64,
    ) -> LoaderResult<RowsPage> {
        let request = self
            .http
            .get(format!("{}/rows", self.endpoint))
            .query(&[
                ("dataset", dataset_id),
                ("config", config_name),
                ("split", split),
            ])
            .query(&[("offset", offset), ("length", u64::from(self.page_size))]);

        self.send(request).await
    }

    /// Sends `request` and decodes the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> LoaderResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, body));
        }

        serde_json::from_str(&body).map_err(|err| {
            loader_error!(
                ErrorKind::SourceResponseInvalid,
                "Dataset hub returned an undecodable response",
                err.to_string(),
                source: err
            )
        })
    }
}

impl DatasetHub for HubClient {
    async fn fetch(&self, dataset_id: &str, split: &str) -> LoaderResult<TabularSnapshot> {
        let config_name = self.resolve_config_name(dataset_id, split).await?;

        let mut columns: Option<Vec<ColumnSchema>> = None;
        let mut rows = Vec::new();
        let mut truncated_rows = 0usize;

        loop {
            let offset = rows.len() as u64;
            let page = self
                .fetch_page(dataset_id, &config_name, split, offset)
                .await?;

            // `num_rows_total` only counts the served rows of a partial split.
            if page.partial {
                bail!(
                    ErrorKind::SourceResponseInvalid,
                    "Split is only partially served by the dataset viewer",
                    format!(
                        "dataset `{dataset_id}` split `{split}` exposes {} rows, the full split is not available",
                        page.num_rows_total
                    )
                );
            }

            if columns.is_none() {
                columns = Some(
                    page.features
                        .iter()
                        .map(|feature| ColumnSchema::new(&feature.name, feature.dtype()))
                        .collect(),
                );
            }

            debug!(
                offset,
                rows = page.rows.len(),
                total = page.num_rows_total,
                "fetched rows page"
            );

            if page.rows.is_empty() {
                break;
            }

            for entry in page.rows {
                if !entry.truncated_cells.is_empty() {
                    truncated_rows += 1;
                    debug!(row_idx = entry.row_idx, cells = ?entry.truncated_cells, "row has truncated cells");
                }
                rows.push(entry.row);
            }

            if rows.len() as u64 >= page.num_rows_total {
                break;
            }
        }

        if truncated_rows > 0 {
            warn!(
                truncated_rows,
                "dataset hub truncated some cells, their values are incomplete"
            );
        }

        TabularSnapshot::new(columns.unwrap_or_default(), rows).map_err(|err| {
            loader_error!(
                ErrorKind::SourceResponseInvalid,
                "Dataset hub returned rows that do not match the features",
                err.detail().unwrap_or_default().to_string(),
                source: err
            )
        })
    }
}

/// Converts a failed HTTP exchange into a fetch error.
fn transport_error(err: reqwest::Error) -> LoaderError {
    loader_error!(
        ErrorKind::SourceConnectionFailed,
        "Failed to reach the dataset hub",
        err.to_string(),
        source: err
    )
}

/// Maps a non-success status of the dataset viewer API to a fetch error.
fn status_error(status: StatusCode, body: String) -> LoaderError {
    let detail = format!("HTTP {status}: {body}");

    match status {
        StatusCode::NOT_FOUND => loader_error!(
            ErrorKind::SourceDatasetNotFound,
            "Dataset not found on the hub",
            detail = detail
        ),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => loader_error!(
            ErrorKind::SourceAuthenticationError,
            "Dataset hub rejected the credentials",
            detail = detail
        ),
        StatusCode::TOO_MANY_REQUESTS => loader_error!(
            ErrorKind::SourceConnectionFailed,
            "Dataset hub rate limit exceeded",
            detail = detail
        ),
        status if status.is_server_error() => loader_error!(
            ErrorKind::SourceConnectionFailed,
            "Dataset hub is unavailable",
            detail = detail
        ),
        _ => loader_error!(
            ErrorKind::SourceRequestFailed,
            "Dataset hub rejected the request",
            detail = detail
        ),
    }
}
