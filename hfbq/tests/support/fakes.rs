use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hfbq::error::{ErrorKind, LoaderError, LoaderResult};
use hfbq::hub::DatasetHub;
use hfbq::loader_error;
use hfbq::types::{DestinationTableId, TabularSnapshot};
use hfbq::warehouse::{LoadJobHandle, LoadJobOutcome, Warehouse};
use tokio::time::Instant;

/// Scripted result of one load attempt.
#[derive(Debug, Clone)]
pub enum LoadStep {
    /// The job completes and reports this many rows.
    Load(u64),
    /// Submitting the job fails.
    FailSubmit(LoaderError),
    /// The job is submitted but completes with an error.
    FailJob(LoaderError),
}

/// Returns a retryable load job failure tagged with `attempt`.
pub fn job_failure(attempt: u32) -> LoaderError {
    loader_error!(
        ErrorKind::LoadJobFailed,
        "Load job failed",
        format!("backendError on attempt {attempt}")
    )
}

#[derive(Debug, Default)]
struct WarehouseInner {
    steps: VecDeque<LoadStep>,
    pending: Vec<(String, LoadStep)>,
    submissions: Vec<Instant>,
    submitted_rows: Vec<usize>,
    completions: u32,
    validations: u32,
    validation_error: Option<LoaderError>,
}

/// In-memory warehouse replaying a script of load outcomes.
///
/// Running out of script is treated as success with zero rows.
#[derive(Debug, Clone, Default)]
pub struct FakeWarehouse {
    inner: Arc<Mutex<WarehouseInner>>,
}

impl FakeWarehouse {
    pub fn new(steps: impl IntoIterator<Item = LoadStep>) -> Self {
        let warehouse = Self::default();
        warehouse.inner.lock().unwrap().steps = steps.into_iter().collect();
        warehouse
    }

    /// Makes destination validation fail with `error`.
    pub fn fail_validation(self, error: LoaderError) -> Self {
        self.inner.lock().unwrap().validation_error = Some(error);
        self
    }

    pub fn submissions(&self) -> Vec<Instant> {
        self.inner.lock().unwrap().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.inner.lock().unwrap().submissions.len()
    }

    pub fn submitted_rows(&self) -> Vec<usize> {
        self.inner.lock().unwrap().submitted_rows.clone()
    }

    pub fn completion_count(&self) -> u32 {
        self.inner.lock().unwrap().completions
    }

    pub fn validation_count(&self) -> u32 {
        self.inner.lock().unwrap().validations
    }

    pub fn remaining_steps(&self) -> usize {
        self.inner.lock().unwrap().steps.len()
    }
}

impl Warehouse for FakeWarehouse {
    async fn validate_destination(&self, _destination: &DestinationTableId) -> LoaderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.validations += 1;

        match inner.validation_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn submit_load(
        &self,
        snapshot: &TabularSnapshot,
        destination: &DestinationTableId,
    ) -> LoaderResult<LoadJobHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.submissions.push(Instant::now());
        inner.submitted_rows.push(snapshot.num_rows());

        let step = inner.steps.pop_front().unwrap_or(LoadStep::Load(0));
        if let LoadStep::FailSubmit(error) = step {
            return Err(error);
        }

        let job_id = format!("job-{}", inner.submissions.len());
        inner.pending.push((job_id.clone(), step));

        Ok(LoadJobHandle {
            project_id: destination.project_id().to_string(),
            job_id,
            location: "US".to_string(),
        })
    }

    async fn await_completion(&self, handle: &LoadJobHandle) -> LoaderResult<LoadJobOutcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.completions += 1;

        let position = inner
            .pending
            .iter()
            .position(|(job_id, _)| job_id == &handle.job_id)
            .expect("completion awaited for an unknown job");
        let (_, step) = inner.pending.remove(position);

        match step {
            LoadStep::Load(rows_loaded) => Ok(LoadJobOutcome { rows_loaded }),
            LoadStep::FailJob(error) | LoadStep::FailSubmit(error) => Err(error),
        }
    }
}

/// Dataset hub serving one fixed result.
#[derive(Debug, Clone)]
pub struct FakeHub {
    result: Result<TabularSnapshot, LoaderError>,
    fetches: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeHub {
    pub fn serving(snapshot: TabularSnapshot) -> Self {
        Self {
            result: Ok(snapshot),
            fetches: Arc::default(),
        }
    }

    pub fn failing(error: LoaderError) -> Self {
        Self {
            result: Err(error),
            fetches: Arc::default(),
        }
    }

    /// Returns the `(dataset_id, split)` pairs fetched so far.
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.lock().unwrap().clone()
    }
}

impl DatasetHub for FakeHub {
    async fn fetch(&self, dataset_id: &str, split: &str) -> LoaderResult<TabularSnapshot> {
        self.fetches
            .lock()
            .unwrap()
            .push((dataset_id.to_string(), split.to_string()));

        self.result.clone()
    }
}
