//! Shared configuration types for the loader.

mod base;
mod destination;
mod loader;
mod retry;
mod source;

pub use base::ValidationError;
pub use destination::{DestinationConfig, ServiceAccountKeySource};
pub use loader::LoaderConfig;
pub use retry::RetryConfig;
pub use source::SourceConfig;
