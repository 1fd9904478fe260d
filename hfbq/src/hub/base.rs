use std::future::Future;

use crate::error::LoaderResult;
use crate::types::TabularSnapshot;

/// Source of dataset splits.
///
/// Errors returned by [`DatasetHub::fetch`] are fetch errors: the pipeline surfaces them
/// immediately and never retries them.
pub trait DatasetHub {
    /// Fetches `split` of `dataset_id` and materializes it in memory.
    fn fetch(
        &self,
        dataset_id: &str,
        split: &str,
    ) -> impl Future<Output = LoaderResult<TabularSnapshot>> + Send;
}
