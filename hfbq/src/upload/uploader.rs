use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{ErrorKind, LoaderError, LoaderResult};
use crate::loader_error;
use crate::types::{DestinationTableId, TabularSnapshot};
use crate::upload::policy::RetryPolicy;
use crate::upload::state::{UploadState, UploadStatus};
use crate::warehouse::{LoadJobOutcome, Warehouse};

/// Summary of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows reported by the completed load job.
    pub rows_loaded: u64,
    /// Number of attempts made, including the successful one.
    pub attempts: u32,
    pub destination: DestinationTableId,
}

/// Loads snapshots into a [`Warehouse`], retrying failed attempts with exponential backoff.
///
/// Each attempt submits a new table-overwrite load job and waits for it to finish. Because the
/// job replaces the whole table, repeating an attempt never duplicates rows.
#[derive(Debug, Clone)]
pub struct RetryingUploader<W> {
    warehouse: W,
    policy: RetryPolicy,
}

impl<W> RetryingUploader<W>
where
    W: Warehouse,
{
    pub fn new(warehouse: W, policy: RetryPolicy) -> Self {
        Self { warehouse, policy }
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    /// Uploads `snapshot` into `destination`, replacing its content.
    ///
    /// Returns [`ErrorKind::RetriesExhausted`] with the last attempt's error as source when
    /// every allowed attempt failed. An error the policy refuses to retry is returned as is.
    pub async fn upload(
        &self,
        snapshot: &TabularSnapshot,
        destination: &DestinationTableId,
    ) -> LoaderResult<LoadReport> {
        let max_attempts = self.policy.max_attempts();
        let mut state = UploadState::new();

        loop {
            match state.status() {
                UploadStatus::Attempting { attempt } => {
                    info!(attempt, max_attempts, %destination, "uploading snapshot");

                    match self.attempt(snapshot, destination).await {
                        Ok(outcome) => state.record_success(outcome.rows_loaded),
                        Err(err) => {
                            let retry = self.policy.should_retry(attempt, &err);
                            let exhausted =
                                attempt >= max_attempts && self.policy.is_retryable(&err);

                            warn!(
                                attempt,
                                max_attempts,
                                error_kind = ?err.kind(),
                                error = %err,
                                "load attempt failed"
                            );
                            state.record_failure(err, retry, exhausted);

                            if retry {
                                let delay = self.policy.backoff_delay(attempt);
                                info!(
                                    attempt,
                                    backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                    "retrying load after backoff"
                                );
                                sleep(delay).await;
                            }
                        }
                    }
                }
                UploadStatus::Succeeded {
                    attempts,
                    rows_loaded,
                } => {
                    info!(rows_loaded, attempts, %destination, "snapshot loaded");

                    return Ok(LoadReport {
                        rows_loaded,
                        attempts,
                        destination: destination.clone(),
                    });
                }
                UploadStatus::Failed {
                    attempts,
                    exhausted,
                } => {
                    return Err(failure_error(&mut state, attempts, exhausted));
                }
            }
        }
    }

    /// Runs one load attempt: submit, then wait for completion.
    async fn attempt(
        &self,
        snapshot: &TabularSnapshot,
        destination: &DestinationTableId,
    ) -> LoaderResult<LoadJobOutcome> {
        let handle = self.warehouse.submit_load(snapshot, destination).await?;

        self.warehouse.await_completion(&handle).await
    }
}

/// Builds the error returned once the upload reached [`UploadStatus::Failed`].
fn failure_error(state: &mut UploadState, attempts: u32, exhausted: bool) -> LoaderError {
    let last_error = state.take_last_error();

    match last_error {
        Some(last_error) if exhausted => loader_error!(
            ErrorKind::RetriesExhausted,
            "All upload attempts failed",
            format!("gave up after {attempts} attempts: {}", last_error.description()),
            source: last_error
        ),
        Some(last_error) => last_error,
        None => loader_error!(
            ErrorKind::Unknown,
            "Upload failed without an error",
            format!("{attempts} attempts")
        ),
    }
}
