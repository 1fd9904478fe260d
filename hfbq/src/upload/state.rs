use crate::error::LoaderError;

/// Current status of the upload state machine.
///
/// Uploads start in [`UploadStatus::Attempting`] with attempt 1 and end in either
/// [`UploadStatus::Succeeded`] or [`UploadStatus::Failed`]. No transition leaves a terminal
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// Load attempt `attempt` (1-indexed) is about to run.
    Attempting { attempt: u32 },
    /// The load job of attempt `attempts` completed.
    Succeeded { attempts: u32, rows_loaded: u64 },
    /// Attempt `attempts` failed and no further attempt is allowed.
    Failed { attempts: u32, exhausted: bool },
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Attempting { .. })
    }
}

/// Tracks attempts and the most recent error of one upload.
#[derive(Debug)]
pub struct UploadState {
    status: UploadStatus,
    last_error: Option<LoaderError>,
}

impl UploadState {
    /// Creates a state about to run the first attempt.
    pub fn new() -> Self {
        Self {
            status: UploadStatus::Attempting { attempt: 1 },
            last_error: None,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Takes the error of the last failed attempt.
    pub fn take_last_error(&mut self) -> Option<LoaderError> {
        self.last_error.take()
    }

    /// Records a completed load job.
    pub fn record_success(&mut self, rows_loaded: u64) {
        if let UploadStatus::Attempting { attempt } = self.status {
            self.status = UploadStatus::Succeeded {
                attempts: attempt,
                rows_loaded,
            };
        }
    }

    /// Records a failed attempt.
    ///
    /// Moves to the next attempt when `retry` is set, otherwise to [`UploadStatus::Failed`].
    /// `exhausted` tells whether the failure is due to the attempt cap rather than the error.
    pub fn record_failure(&mut self, error: LoaderError, retry: bool, exhausted: bool) {
        let UploadStatus::Attempting { attempt } = self.status else {
            return;
        };

        self.last_error = Some(error);
        self.status = if retry {
            UploadStatus::Attempting {
                attempt: attempt + 1,
            }
        } else {
            UploadStatus::Failed {
                attempts: attempt,
                exhausted,
            }
        };
    }
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new()
    }
}
