use std::future::Future;

use crate::error::LoaderResult;
use crate::types::{DestinationTableId, TabularSnapshot};

/// Reference to a submitted load job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadJobHandle {
    /// Project the job runs in.
    pub project_id: String,
    /// Identifier of the job, unique per attempt.
    pub job_id: String,
    /// Location the job runs in.
    pub location: String,
}

/// Result of a load job that completed successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadJobOutcome {
    pub rows_loaded: u64,
}

/// Trait for warehouses that accept table-overwrite load jobs.
///
/// A load attempt is [`Warehouse::submit_load`] followed by [`Warehouse::await_completion`].
/// Submissions always replace the whole destination table and create it when missing, so an
/// attempt can be repeated without duplicating data.
pub trait Warehouse {
    /// Checks that the destination namespace exists and is usable by this warehouse.
    ///
    /// Called once before the dataset is fetched. The default implementation accepts every
    /// destination.
    fn validate_destination(
        &self,
        _destination: &DestinationTableId,
    ) -> impl Future<Output = LoaderResult<()>> + Send {
        async { Ok(()) }
    }

    /// Submits `snapshot` as a load job that overwrites `destination`.
    ///
    /// The table schema is detected by the warehouse from the data.
    fn submit_load(
        &self,
        snapshot: &TabularSnapshot,
        destination: &DestinationTableId,
    ) -> impl Future<Output = LoaderResult<LoadJobHandle>> + Send;

    /// Waits until the job behind `handle` finishes.
    ///
    /// Returns an error when the job itself failed.
    fn await_completion(
        &self,
        handle: &LoadJobHandle,
    ) -> impl Future<Output = LoaderResult<LoadJobOutcome>> + Send;
}
