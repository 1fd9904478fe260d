//! Table-overwrite upload with bounded exponential backoff.

mod policy;
mod state;
mod uploader;

pub use policy::RetryPolicy;
pub use state::{UploadState, UploadStatus};
pub use uploader::{LoadReport, RetryingUploader};
