use std::time::Duration;

use hfbq::error::ErrorKind;
use hfbq::types::DestinationTableId;
use hfbq::upload::{RetryPolicy, RetryingUploader};
use hfbq::warehouse::Warehouse;
use hfbq::warehouse::bigquery::BigQueryClient;
use hfbq_telemetry::tracing::init_test_tracing;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::support::google::{
    ACCESS_TOKEN, DATASET_ID, GoogleApiMock, PROJECT_ID, TABLE_ID,
};
use crate::support::snapshots::reviews_snapshot;

mod support;

const JOB_ID: &str = "hfbq_load_fixed";

fn destination() -> DestinationTableId {
    DestinationTableId::new(PROJECT_ID, DATASET_ID, TABLE_ID).unwrap()
}

fn job(state: &str) -> Value {
    json!({
        "kind": "bigquery#job",
        "jobReference": {"projectId": PROJECT_ID, "jobId": JOB_ID, "location": "US"},
        "status": {"state": state}
    })
}

fn jobs_upload_path() -> String {
    format!("/upload/bigquery/v2/projects/{PROJECT_ID}/jobs")
}

fn job_path() -> String {
    format!("/bigquery/v2/projects/{PROJECT_ID}/jobs/{JOB_ID}")
}

async fn start_google() -> GoogleApiMock {
    let google = GoogleApiMock::start().await;
    google.mock_token(1..).await;
    google
}

async fn client(google: &GoogleApiMock) -> BigQueryClient {
    BigQueryClient::new(&google.destination_config())
        .await
        .unwrap()
}

async fn mount_submit(google: &GoogleApiMock, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(jobs_upload_path()))
        .and(query_param("uploadType", "multipart"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(response)
        .mount(google)
        .await;
}

async fn mount_job_status(google: &GoogleApiMock, body: Value) {
    Mock::given(method("GET"))
        .and(path(job_path()))
        .and(query_param("location", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(google)
        .await;
}

#[tokio::test]
async fn uploads_snapshot_as_multipart_overwrite_job() {
    init_test_tracing();

    let google = start_google().await;
    mount_submit(&google, ResponseTemplate::new(200).set_body_json(job("RUNNING"))).await;
    Mock::given(method("GET"))
        .and(path(job_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(job("RUNNING")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&google)
        .await;
    let mut done = job("DONE");
    done["statistics"] = json!({"load": {"inputFiles": "1", "outputRows": "3"}});
    mount_job_status(&google, done).await;

    let client = client(&google).await;
    let handle = client
        .submit_load(&reviews_snapshot(3), &destination())
        .await
        .unwrap();
    assert_eq!(handle.job_id, JOB_ID);
    assert_eq!(handle.location, "US");

    let outcome = client.await_completion(&handle).await.unwrap();
    assert_eq!(outcome.rows_loaded, 3);

    let requests = google.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|request| request.url.path() == jobs_upload_path())
        .unwrap();
    let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/related; boundary="));

    let body = String::from_utf8(upload.body.clone()).unwrap();
    assert!(body.contains(r#""writeDisposition":"WRITE_TRUNCATE""#));
    assert!(body.contains(r#""createDisposition":"CREATE_IF_NEEDED""#));
    assert!(body.contains(r#""sourceFormat":"NEWLINE_DELIMITED_JSON""#));
    assert!(body.contains(r#""autodetect":true"#));
    assert!(body.contains(&format!(
        r#""destinationTable":{{"projectId":"{PROJECT_ID}","datasetId":"{DATASET_ID}","tableId":"{TABLE_ID}"}}"#
    )));
    let rows: Vec<Value> = body
        .split("\r\n")
        .flat_map(|part| part.lines())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|value| value.get("text").is_some())
        .collect();
    assert_eq!(
        rows,
        vec![
            json!({"text": "review 0", "label": 0}),
            json!({"text": "review 1", "label": 1}),
            json!({"text": "review 2", "label": 0}),
        ]
    );

    let polls = requests
        .iter()
        .filter(|request| request.url.path() == job_path())
        .count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn job_error_result_fails_the_attempt() {
    init_test_tracing();

    let google = start_google().await;
    mount_submit(&google, ResponseTemplate::new(200).set_body_json(job("PENDING"))).await;
    let mut failed = job("DONE");
    failed["status"]["errorResult"] = json!({"reason": "backendError", "message": "Backend error. Job aborted."});
    mount_job_status(&google, failed).await;

    let client = client(&google).await;
    let handle = client
        .submit_load(&reviews_snapshot(2), &destination())
        .await
        .unwrap();
    let err = client.await_completion(&handle).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LoadJobFailed);
    assert!(err.detail().unwrap().contains("Backend error. Job aborted."));
}

#[tokio::test]
async fn rejected_data_is_an_invalid_request() {
    init_test_tracing();

    let google = start_google().await;
    mount_submit(&google, ResponseTemplate::new(200).set_body_json(job("RUNNING"))).await;
    let mut failed = job("DONE");
    failed["status"]["errorResult"] = json!({
        "reason": "invalid",
        "message": "Error while reading data, error message: JSON table encountered too many errors"
    });
    mount_job_status(&google, failed).await;

    let client = client(&google).await;
    let handle = client
        .submit_load(&reviews_snapshot(2), &destination())
        .await
        .unwrap();
    let err = client.await_completion(&handle).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationRequestInvalid);
}

#[tokio::test]
async fn synchronously_failed_submission_is_an_error() {
    init_test_tracing();

    let google = start_google().await;
    let mut failed = job("DONE");
    failed["status"]["errorResult"] = json!({"reason": "notFound", "message": "Not found: Dataset test-project:hf_imports"});
    mount_submit(&google, ResponseTemplate::new(200).set_body_json(failed)).await;

    let client = client(&google).await;
    let err = client
        .submit_load(&reviews_snapshot(2), &destination())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationNotFound);
}

#[tokio::test]
async fn denied_submission_maps_to_permission_error() {
    init_test_tracing();

    let google = start_google().await;
    mount_submit(
        &google,
        ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Access Denied: Project test-project: User does not have bigquery.jobs.create permission",
                "errors": [{"reason": "accessDenied", "message": "Access Denied"}],
                "status": "PERMISSION_DENIED"
            }
        })),
    )
    .await;

    let client = client(&google).await;
    let err = client
        .submit_load(&reviews_snapshot(1), &destination())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationPermissionDenied);
    assert!(err.detail().unwrap().contains("bigquery.jobs.create"));
}

#[tokio::test]
async fn uploader_retries_unavailable_backend() {
    init_test_tracing();

    let google = start_google().await;
    Mock::given(method("POST"))
        .and(path(jobs_upload_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&google)
        .await;
    mount_submit(&google, ResponseTemplate::new(200).set_body_json(job("RUNNING"))).await;
    let mut done = job("DONE");
    done["statistics"] = json!({"load": {"outputRows": "4"}});
    mount_job_status(&google, done).await;

    let uploader = RetryingUploader::new(
        client(&google).await,
        RetryPolicy::new(3, 2, Duration::from_millis(5)),
    );
    let report = uploader
        .upload(&reviews_snapshot(4), &destination())
        .await
        .unwrap();

    assert_eq!(report.rows_loaded, 4);
    assert_eq!(report.attempts, 2);
}

#[tokio::test]
async fn existing_dataset_in_matching_location_is_valid() {
    init_test_tracing();

    let google = start_google().await;
    Mock::given(method("GET"))
        .and(path(format!("/bigquery/v2/projects/{PROJECT_ID}/datasets/{DATASET_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "bigquery#dataset",
            "datasetReference": {"projectId": PROJECT_ID, "datasetId": DATASET_ID},
            "location": "us"
        })))
        .expect(1)
        .mount(&google)
        .await;

    client(&google)
        .await
        .validate_destination(&destination())
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_dataset_is_a_missing_namespace() {
    init_test_tracing();

    let google = start_google().await;
    Mock::given(method("GET"))
        .and(path(format!("/bigquery/v2/projects/{PROJECT_ID}/datasets/{DATASET_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not found: Dataset test-project:hf_imports"}
        })))
        .mount(&google)
        .await;

    let err = client(&google)
        .await
        .validate_destination(&destination())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationNamespaceMissing);
    assert!(!err.kind().is_transient());
}

#[tokio::test]
async fn dataset_in_another_location_is_a_config_error() {
    init_test_tracing();

    let google = start_google().await;
    Mock::given(method("GET"))
        .and(path(format!("/bigquery/v2/projects/{PROJECT_ID}/datasets/{DATASET_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"location": "EU"})))
        .mount(&google)
        .await;

    let err = client(&google)
        .await
        .validate_destination(&destination())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
    assert!(err.detail().unwrap().contains("`EU`"));
}

#[tokio::test]
async fn unreadable_key_file_is_a_config_error() {
    init_test_tracing();

    let google = GoogleApiMock::start().await;
    let mut config = google.destination_config();
    config.service_account_key = None;
    config.service_account_key_path = Some("/nonexistent/hfbq/key.json".to_string());

    let err = match BigQueryClient::new(&config).await {
        Ok(_) => panic!("client built without a readable key"),
        Err(err) => err,
    };

    assert_eq!(err.kind(), ErrorKind::ConfigError);
}
