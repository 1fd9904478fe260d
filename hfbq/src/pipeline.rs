//! End-to-end load of one dataset split into one table.

use hfbq_config::shared::LoaderConfig;
use tracing::{info, warn};

use crate::error::LoaderResult;
use crate::hub::DatasetHub;
use crate::types::DestinationTableId;
use crate::upload::{LoadReport, RetryPolicy, RetryingUploader};
use crate::warehouse::Warehouse;

/// Source split read by a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSplit {
    pub dataset_id: String,
    pub split: String,
}

/// Fetches a split from a [`DatasetHub`] and uploads it to a [`Warehouse`].
///
/// Steps run strictly in order: the destination dataset is validated (unless disabled), the
/// split is fetched, and the snapshot is uploaded. A missing or misplaced destination dataset
/// and fetch failures are returned immediately. Transient validation failures are logged and
/// left to the retried upload.
#[derive(Debug)]
pub struct LoadPipeline<H, W> {
    hub: H,
    uploader: RetryingUploader<W>,
    source: SourceSplit,
    destination: DestinationTableId,
    validate_destination: bool,
}

impl<H, W> LoadPipeline<H, W>
where
    H: DatasetHub,
    W: Warehouse,
{
    pub fn new(
        hub: H,
        warehouse: W,
        policy: RetryPolicy,
        source: SourceSplit,
        destination: DestinationTableId,
    ) -> Self {
        Self {
            hub,
            uploader: RetryingUploader::new(warehouse, policy),
            source,
            destination,
            validate_destination: true,
        }
    }

    /// Builds a pipeline for the source, destination, and retry policy of `config`.
    pub fn from_config(config: &LoaderConfig, hub: H, warehouse: W) -> LoaderResult<Self> {
        let destination = DestinationTableId::new(
            config.destination.project_id.as_str(),
            config.destination.dataset_id.as_str(),
            config.destination.table_id.as_str(),
        )?;
        let source = SourceSplit {
            dataset_id: config.source.dataset_id.clone(),
            split: config.source.split.clone(),
        };

        let pipeline = Self::new(
            hub,
            warehouse,
            RetryPolicy::from(&config.retry),
            source,
            destination,
        )
        .with_destination_validation(config.destination.validate_destination);

        Ok(pipeline)
    }

    /// Enables or disables the destination check that runs before fetching.
    pub fn with_destination_validation(mut self, validate_destination: bool) -> Self {
        self.validate_destination = validate_destination;
        self
    }

    pub fn destination(&self) -> &DestinationTableId {
        &self.destination
    }

    /// Runs the pipeline once.
    pub async fn run(&self) -> LoaderResult<LoadReport> {
        info!(
            dataset_id = %self.source.dataset_id,
            split = %self.source.split,
            destination = %self.destination,
            "starting load"
        );

        if self.validate_destination {
            match self
                .uploader
                .warehouse()
                .validate_destination(&self.destination)
                .await
            {
                Ok(()) => {}
                // Left to the upload retries.
                Err(err) if err.kind().is_transient() => {
                    warn!(
                        error_kind = ?err.kind(),
                        error = %err,
                        destination = %self.destination,
                        "destination validation failed, continuing with the load"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        info!(dataset_id = %self.source.dataset_id, "downloading dataset from the hub");
        let snapshot = self
            .hub
            .fetch(&self.source.dataset_id, &self.source.split)
            .await?;
        info!(
            rows = snapshot.num_rows(),
            columns = snapshot.num_columns(),
            "dataset fetched"
        );

        self.uploader.upload(&snapshot, &self.destination).await
    }
}
