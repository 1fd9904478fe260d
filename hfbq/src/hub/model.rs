//! Response bodies of the dataset viewer API.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of `GET /splits`.
#[derive(Debug, Deserialize)]
pub(crate) struct SplitsResponse {
    pub splits: Vec<SplitEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SplitEntry {
    pub config: String,
    pub split: String,
}

/// Body of `GET /rows`.
#[derive(Debug, Deserialize)]
pub(crate) struct RowsPage {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub rows: Vec<RowEntry>,
    pub num_rows_total: u64,
    /// Set when the viewer only serves a prefix of the split.
    #[serde(default)]
    pub partial: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: Value,
}

impl Feature {
    /// Returns the feature's data type.
    ///
    /// Plain values carry a `dtype`, composite features only a `_type` such as `ClassLabel` or
    /// `Sequence`. Legacy list features are encoded as a bare JSON array.
    pub fn dtype(&self) -> String {
        match &self.feature_type {
            Value::Object(fields) => fields
                .get("dtype")
                .or_else(|| fields.get("_type"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            Value::Array(_) => "list".to_string(),
            _ => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RowEntry {
    pub row_idx: u64,
    pub row: Map<String, Value>,
    #[serde(default)]
    pub truncated_cells: Vec<String>,
}
