//! BigQuery REST resources used by the load path.

use serde::{Deserialize, Serialize};

/// Format of the uploaded payload.
pub(crate) const SOURCE_FORMAT_NDJSON: &str = "NEWLINE_DELIMITED_JSON";
/// Replaces the table content with the job's data.
pub(crate) const WRITE_TRUNCATE: &str = "WRITE_TRUNCATE";
/// Creates the table when it does not exist.
pub(crate) const CREATE_IF_NEEDED: &str = "CREATE_IF_NEEDED";
/// Job state reported once a job finished, successfully or not.
pub(crate) const JOB_STATE_DONE: &str = "DONE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// Job resource sent when inserting a load job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadJobRequest {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobConfiguration {
    pub load: LoadConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadConfiguration {
    pub destination_table: TableReference,
    pub source_format: &'static str,
    pub write_disposition: &'static str,
    pub create_disposition: &'static str,
    pub autodetect: bool,
}

impl LoadJobRequest {
    /// Builds an NDJSON table-overwrite load job with schema autodetection.
    pub(crate) fn overwrite(job_reference: JobReference, destination: TableReference) -> Self {
        Self {
            job_reference,
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: destination,
                    source_format: SOURCE_FORMAT_NDJSON,
                    write_disposition: WRITE_TRUNCATE,
                    create_disposition: CREATE_IF_NEEDED,
                    autodetect: true,
                },
            },
        }
    }
}

/// Job resource returned by `jobs.insert` and `jobs.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Job {
    pub job_reference: JobReference,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub statistics: Option<JobStatistics>,
}

impl Job {
    pub(crate) fn is_done(&self) -> bool {
        self.status.state.as_deref() == Some(JOB_STATE_DONE)
    }

    /// Rows written by a finished load job, zero when not reported.
    ///
    /// BigQuery encodes 64-bit counters as JSON strings.
    pub(crate) fn output_rows(&self) -> u64 {
        self.statistics
            .as_ref()
            .and_then(|statistics| statistics.load.as_ref())
            .and_then(|load| load.output_rows.as_deref())
            .and_then(|rows| rows.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStatus {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStatistics {
    #[serde(default)]
    pub load: Option<LoadStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadStatistics {
    #[serde(default)]
    pub output_rows: Option<String>,
}

/// Error entry of a job status or an error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Dataset resource returned by `datasets.get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Dataset {
    #[serde(default)]
    pub location: Option<String>,
}

/// Body of a non-success response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}
