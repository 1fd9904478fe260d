use hfbq::hub::HubClient;
use hfbq::pipeline::LoadPipeline;
use hfbq::upload::LoadReport;
use hfbq::warehouse::bigquery::BigQueryClient;
use hfbq_config::shared::{DestinationConfig, LoaderConfig, RetryConfig, SourceConfig};
use tracing::{debug, info};

use crate::error::LoaderCliResult;

/// Builds the hub and BigQuery clients and runs the load pipeline once.
pub async fn start_loader_with_config(config: LoaderConfig) -> LoaderCliResult<LoadReport> {
    info!("starting hugging face to bigquery load");

    log_config(&config);

    let hub = HubClient::new(&config.source)?;
    let warehouse = BigQueryClient::new(&config.destination).await?;

    let pipeline = LoadPipeline::from_config(&config, hub, warehouse)?;
    let report = pipeline.run().await?;

    info!(
        rows_loaded = report.rows_loaded,
        attempts = report.attempts,
        destination = %report.destination,
        "load finished"
    );

    Ok(report)
}

fn log_config(config: &LoaderConfig) {
    log_source_config(&config.source);
    log_destination_config(&config.destination);
    log_retry_config(&config.retry);
}

fn log_source_config(config: &SourceConfig) {
    debug!(
        dataset_id = config.dataset_id,
        split = config.split,
        config_name = config.config_name.as_deref(),
        endpoint = config.endpoint,
        page_size = config.page_size,
        token_configured = config.token.is_some(),
        "source config"
    );
}

fn log_destination_config(config: &DestinationConfig) {
    debug!(
        project_id = config.project_id,
        dataset_id = config.dataset_id,
        table_id = config.table_id,
        location = config.location,
        endpoint = config.endpoint,
        validate_destination = config.validate_destination,
        job_poll_interval_ms = config.job_poll_interval_ms,
        "destination config"
    );
}

fn log_retry_config(config: &RetryConfig) {
    debug!(
        max_attempts = config.max_attempts,
        backoff_base = config.backoff_base,
        backoff_unit_ms = config.backoff_unit_ms,
        retry_all_errors = config.retry_all_errors,
        "retry config"
    );
}
