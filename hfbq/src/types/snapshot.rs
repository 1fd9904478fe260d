use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::bail;
use crate::error::{ErrorKind, LoaderResult};

/// One row of a snapshot, keyed by column name.
///
/// Columns absent from the map are loaded as `NULL`.
pub type Row = Map<String, Value>;

/// Name and hub data type of a snapshot column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    /// Data type reported by the hub, e.g. `string`, `int64` or `ClassLabel`.
    pub dtype: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, dtype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dtype: dtype.into(),
        }
    }
}

/// A dataset split fully materialized in memory.
///
/// The column schema is fixed at construction and every row is checked against it, so a
/// snapshot never holds a value for a column it does not declare.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularSnapshot {
    columns: Vec<ColumnSchema>,
    rows: Vec<Row>,
}

impl TabularSnapshot {
    /// Builds a snapshot from its schema and rows.
    ///
    /// Fails with [`ErrorKind::InvalidData`] when two columns share a name or when a row holds
    /// a column missing from the schema.
    pub fn new(columns: Vec<ColumnSchema>, rows: Vec<Row>) -> LoaderResult<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                bail!(
                    ErrorKind::InvalidData,
                    "Snapshot schema has a duplicate column",
                    format!("column `{}` is declared more than once", column.name)
                );
            }
        }

        for (index, row) in rows.iter().enumerate() {
            if let Some(unknown) = row.keys().find(|key| !names.contains(key.as_str())) {
                bail!(
                    ErrorKind::InvalidData,
                    "Snapshot row does not match the schema",
                    format!("row {index} has unknown column `{unknown}`")
                );
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
