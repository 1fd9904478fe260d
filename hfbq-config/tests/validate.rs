use hfbq_config::shared::{LoaderConfig, ValidationError};

fn config(overrides: serde_json::Value) -> LoaderConfig {
    let mut base = serde_json::json!({
        "source": { "dataset_id": "stanfordnlp/imdb" },
        "destination": {
            "project_id": "my-project",
            "dataset_id": "hub_data",
            "table_id": "imdb",
            "location": "US",
            "service_account_key_path": "/secrets/sa.json"
        }
    });

    merge(&mut base, overrides);
    serde_json::from_value(base).unwrap()
}

fn merge(target: &mut serde_json::Value, overrides: serde_json::Value) {
    match (target, overrides) {
        (serde_json::Value::Object(target), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge(target.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, value) => *target = value,
    }
}

#[test]
fn valid_config_passes() {
    assert_eq!(config(serde_json::json!({})).validate(), Ok(()));
}

#[test]
fn empty_table_id_is_rejected() {
    let err = config(serde_json::json!({ "destination": { "table_id": "" } }))
        .validate()
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::EmptyField {
            field: "destination.table_id".to_string()
        }
    );
}

#[test]
fn whitespace_table_id_is_left_to_bigquery() {
    let config = config(serde_json::json!({ "destination": { "table_id": "  " } }));

    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn empty_split_is_rejected() {
    let err = config(serde_json::json!({ "source": { "split": "" } }))
        .validate()
        .unwrap_err();

    assert_eq!(
        err,
        ValidationError::EmptyField {
            field: "source.split".to_string()
        }
    );
}

#[test]
fn zero_attempts_are_rejected() {
    let err = config(serde_json::json!({ "retry": { "max_attempts": 0 } }))
        .validate()
        .unwrap_err();

    assert!(matches!(err, ValidationError::InvalidFieldValue { field, .. } if field == "retry.max_attempts"));
}

#[test]
fn page_size_above_limit_is_rejected() {
    let err = config(serde_json::json!({ "source": { "page_size": 101 } }))
        .validate()
        .unwrap_err();

    assert!(matches!(err, ValidationError::InvalidFieldValue { field, .. } if field == "source.page_size"));
}

#[test]
fn missing_credentials_are_rejected() {
    let err = config(serde_json::json!({
        "destination": { "service_account_key_path": null }
    }))
    .validate()
    .unwrap_err();

    assert_eq!(err, ValidationError::MissingCredentials);
}
