//! Loads one split of a Hugging Face dataset into a BigQuery table.
//!
//! The crate is organized around a single linear pipeline:
//!
//! 1. [`types::DestinationTableId`] resolves the fully-qualified destination table.
//! 2. A [`hub::DatasetHub`] fetches the split as a [`types::TabularSnapshot`].
//! 3. The [`upload::RetryingUploader`] submits the snapshot to a [`warehouse::Warehouse`] as a
//!    table-overwrite load job, retrying with exponential backoff.
//!
//! [`pipeline::LoadPipeline`] wires the three steps together.

pub mod error;
pub mod hub;
mod macros;
pub mod pipeline;
pub mod types;
pub mod upload;
pub mod warehouse;
