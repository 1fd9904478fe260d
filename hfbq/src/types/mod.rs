//! Core data types shared by the fetch and upload steps.

mod snapshot;
mod table;

pub use snapshot::{ColumnSchema, Row, TabularSnapshot};
pub use table::DestinationTableId;
