use hfbq::types::{ColumnSchema, Row, TabularSnapshot};
use serde_json::json;

/// Builds a two-column snapshot with `num_rows` rows.
pub fn reviews_snapshot(num_rows: usize) -> TabularSnapshot {
    let rows = (0..num_rows)
        .map(|index| {
            let value = json!({"text": format!("review {index}"), "label": index % 2});
            match value {
                serde_json::Value::Object(row) => row,
                _ => Row::new(),
            }
        })
        .collect();

    TabularSnapshot::new(
        vec![
            ColumnSchema::new("text", "string"),
            ColumnSchema::new("label", "int64"),
        ],
        rows,
    )
    .unwrap()
}
