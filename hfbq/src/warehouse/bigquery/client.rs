use std::time::Duration;

use hfbq_config::shared::DestinationConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ErrorKind, LoaderError, LoaderResult};
use crate::types::{DestinationTableId, TabularSnapshot};
use crate::warehouse::base::{LoadJobHandle, LoadJobOutcome, Warehouse};
use crate::warehouse::bigquery::auth::TokenProvider;
use crate::warehouse::bigquery::encoding::{
    encode_ndjson, multipart_content_type, multipart_related_body,
};
use crate::warehouse::bigquery::model::{
    Dataset, ErrorProto, ErrorResponse, Job, JobReference, LoadJobRequest, TableReference,
};
use crate::{bail, loader_error};

/// Prefix of generated load job identifiers.
const JOB_ID_PREFIX: &str = "hfbq_load_";

/// Client for loading snapshots into BigQuery.
///
/// Every load attempt uploads the rows as newline-delimited JSON through a multipart media
/// upload, creating a `WRITE_TRUNCATE` job with schema autodetection, and then polls the job
/// until it is done.
#[derive(Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    endpoint: String,
    location: String,
    poll_interval: Duration,
}

impl BigQueryClient {
    /// Creates a client from the destination section of the configuration.
    ///
    /// The service account key is taken inline when configured, otherwise read from the key
    /// path.
    pub async fn new(config: &DestinationConfig) -> LoaderResult<Self> {
        let Some(key_source) = config.service_account_key_source() else {
            bail!(
                ErrorKind::ConfigError,
                "No BigQuery service account key configured"
            );
        };

        let tokens = TokenProvider::from_key_source(key_source).await?;

        Self::with_tokens(config, tokens)
    }

    fn with_tokens(config: &DestinationConfig, tokens: TokenProvider) -> LoaderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| {
                loader_error!(
                    ErrorKind::ConfigError,
                    "Failed to build the BigQuery HTTP client",
                    err.to_string(),
                    source: err
                )
            })?;

        Ok(Self {
            http,
            tokens,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            location: config.location.clone(),
            poll_interval: config.job_poll_interval(),
        })
    }

    async fn get_job(&self, handle: &LoadJobHandle) -> LoaderResult<Job> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/jobs/{}",
            self.endpoint, handle.project_id, handle.job_id
        );
        let request = self
            .http
            .get(url)
            .query(&[("location", handle.location.as_str())]);

        self.send(request).await
    }

    /// Authorizes and sends `request`, decoding the JSON body of a successful response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> LoaderResult<T> {
        let token = self.tokens.access_token().await?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            loader_error!(
                ErrorKind::DestinationResponseInvalid,
                "BigQuery returned an undecodable response",
                err.to_string(),
                source: err
            )
        })
    }
}

impl Warehouse for BigQueryClient {
    async fn validate_destination(&self, destination: &DestinationTableId) -> LoaderResult<()> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/datasets/{}",
            self.endpoint,
            destination.project_id(),
            destination.dataset_id()
        );

        let dataset: Dataset = match self.send(self.http.get(url)).await {
            Ok(dataset) => dataset,
            Err(err) if err.kind() == ErrorKind::DestinationNotFound => {
                return Err(loader_error!(
                    ErrorKind::DestinationNamespaceMissing,
                    "Destination dataset does not exist",
                    format!(
                        "dataset `{}.{}` must be created before loading",
                        destination.project_id(),
                        destination.dataset_id()
                    ),
                    source: err
                ));
            }
            Err(err) => return Err(err),
        };

        if let Some(location) = dataset.location.as_deref()
            && !location.eq_ignore_ascii_case(&self.location)
        {
            bail!(
                ErrorKind::ConfigError,
                "Destination dataset is in a different location",
                format!(
                    "dataset `{}.{}` is in `{location}` but the configured location is `{}`",
                    destination.project_id(),
                    destination.dataset_id(),
                    self.location
                )
            );
        }

        debug!(%destination, location = %self.location, "destination dataset validated");

        Ok(())
    }

    async fn submit_load(
        &self,
        snapshot: &TabularSnapshot,
        destination: &DestinationTableId,
    ) -> LoaderResult<LoadJobHandle> {
        let job_reference = JobReference {
            project_id: destination.project_id().to_string(),
            job_id: format!("{JOB_ID_PREFIX}{}", Uuid::new_v4().simple()),
            location: Some(self.location.clone()),
        };
        let job = LoadJobRequest::overwrite(
            job_reference.clone(),
            TableReference {
                project_id: destination.project_id().to_string(),
                dataset_id: destination.dataset_id().to_string(),
                table_id: destination.table_id().to_string(),
            },
        );

        let payload = encode_ndjson(snapshot)?;
        let boundary = format!("hfbq_{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &job, &payload)?;

        let url = format!(
            "{}/upload/bigquery/v2/projects/{}/jobs",
            self.endpoint,
            destination.project_id()
        );
        let request = self
            .http
            .post(url)
            .query(&[("uploadType", "multipart")])
            .header(CONTENT_TYPE, multipart_content_type(&boundary))
            .body(body);

        let job: Job = self.send(request).await?;

        info!(
            job_id = %job.job_reference.job_id,
            %destination,
            payload_bytes = payload.len(),
            "load job submitted"
        );

        // BigQuery may validate the job synchronously and return it already failed.
        if let Some(error) = job.status.error_result.as_ref() {
            return Err(job_error(&job_reference.job_id, error, &job.status.errors));
        }

        Ok(LoadJobHandle {
            project_id: job.job_reference.project_id,
            job_id: job.job_reference.job_id,
            location: job
                .job_reference
                .location
                .unwrap_or_else(|| self.location.clone()),
        })
    }

    async fn await_completion(&self, handle: &LoadJobHandle) -> LoaderResult<LoadJobOutcome> {
        loop {
            let job = self.get_job(handle).await?;

            if job.is_done() {
                if let Some(error) = job.status.error_result.as_ref() {
                    return Err(job_error(&handle.job_id, error, &job.status.errors));
                }

                return Ok(LoadJobOutcome {
                    rows_loaded: job.output_rows(),
                });
            }

            debug!(
                job_id = %handle.job_id,
                state = job.status.state.as_deref().unwrap_or("UNKNOWN"),
                "load job still running"
            );

            sleep(self.poll_interval).await;
        }
    }
}

/// Converts a failed HTTP exchange into a connection error.
fn transport_error(err: reqwest::Error) -> LoaderError {
    loader_error!(
        ErrorKind::DestinationConnectionFailed,
        "Failed to reach BigQuery",
        err.to_string(),
        source: err
    )
}

/// Maps a non-success status of the BigQuery API to a destination error.
fn status_error(status: StatusCode, body: &str) -> LoaderError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|response| {
            let reason = response
                .error
                .errors
                .first()
                .and_then(|error| error.reason.clone());
            response.error.message.map(|message| match reason {
                Some(reason) => format!("{reason}: {message}"),
                None => message,
            })
        })
        .unwrap_or_else(|| body.to_string());
    let detail = format!("HTTP {status}: {message}");

    match status {
        StatusCode::BAD_REQUEST => loader_error!(
            ErrorKind::DestinationRequestInvalid,
            "BigQuery rejected the request",
            detail = detail
        ),
        StatusCode::UNAUTHORIZED => loader_error!(
            ErrorKind::DestinationAuthenticationError,
            "BigQuery rejected the credentials",
            detail = detail
        ),
        StatusCode::FORBIDDEN => loader_error!(
            ErrorKind::DestinationPermissionDenied,
            "BigQuery denied access",
            detail = detail
        ),
        StatusCode::NOT_FOUND => loader_error!(
            ErrorKind::DestinationNotFound,
            "BigQuery resource not found",
            detail = detail
        ),
        StatusCode::TOO_MANY_REQUESTS => loader_error!(
            ErrorKind::DestinationConnectionFailed,
            "BigQuery rate limit exceeded",
            detail = detail
        ),
        status if status.is_server_error() => loader_error!(
            ErrorKind::DestinationConnectionFailed,
            "BigQuery is unavailable",
            detail = detail
        ),
        _ => loader_error!(
            ErrorKind::DestinationRequestInvalid,
            "BigQuery request failed",
            detail = detail
        ),
    }
}

/// Converts the `errorResult` of a finished job into an error.
///
/// Reasons that cannot go away by resubmitting the same job get a permanent kind, everything
/// else is reported as [`ErrorKind::LoadJobFailed`].
fn job_error(job_id: &str, error: &ErrorProto, errors: &[ErrorProto]) -> LoaderError {
    let reason = error.reason.as_deref().unwrap_or("unknown");
    let message = error.message.as_deref().unwrap_or("no message");

    let mut detail = format!("job `{job_id}` failed with `{reason}`: {message}");
    for extra in errors.iter().take(5) {
        if let Some(extra_message) = extra.message.as_deref()
            && extra_message != message
        {
            detail.push_str("\n  ");
            if let Some(location) = extra.location.as_deref() {
                detail.push_str(location);
                detail.push_str(": ");
            }
            detail.push_str(extra_message);
        }
    }

    match reason {
        "invalid" | "invalidQuery" => loader_error!(
            ErrorKind::DestinationRequestInvalid,
            "BigQuery load job rejected the data",
            detail = detail
        ),
        "notFound" => loader_error!(
            ErrorKind::DestinationNotFound,
            "BigQuery load job target not found",
            detail = detail
        ),
        "accessDenied" => loader_error!(
            ErrorKind::DestinationPermissionDenied,
            "BigQuery load job was denied access",
            detail = detail
        ),
        _ => loader_error!(
            ErrorKind::LoadJobFailed,
            "BigQuery load job failed",
            detail = detail
        ),
    }
}
