//! Warehouse access: load job submission and completion.

mod base;
pub mod bigquery;

pub use base::{LoadJobHandle, LoadJobOutcome, Warehouse};
