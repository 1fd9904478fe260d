//! Request body encoding for media-upload load jobs.

use std::io::Write;

use crate::error::LoaderResult;
use crate::types::TabularSnapshot;
use crate::warehouse::bigquery::model::LoadJobRequest;

/// Encodes every snapshot row as one JSON object per line.
pub(crate) fn encode_ndjson(snapshot: &TabularSnapshot) -> LoaderResult<Vec<u8>> {
    let mut payload = Vec::new();
    for row in snapshot.rows() {
        serde_json::to_writer(&mut payload, row)?;
        payload.push(b'\n');
    }

    Ok(payload)
}

/// Builds a `multipart/related` body holding the job resource followed by the data.
///
/// The boundary must not occur in either part. Callers use a random boundary.
pub(crate) fn multipart_related_body(
    boundary: &str,
    job: &LoadJobRequest,
    payload: &[u8],
) -> LoaderResult<Vec<u8>> {
    let metadata = serde_json::to_vec(job)?;

    let mut body = Vec::with_capacity(metadata.len() + payload.len() + 4 * boundary.len() + 128);
    write!(
        body,
        "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"
    )?;
    body.extend_from_slice(&metadata);
    write!(
        body,
        "\r\n--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n"
    )?;
    body.extend_from_slice(payload);
    write!(body, "\r\n--{boundary}--\r\n")?;

    Ok(body)
}

/// Returns the `Content-Type` header value of a body built with `boundary`.
pub(crate) fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/related; boundary={boundary}")
}
