use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::table::{Table, SENTINEL};

/// Collapse rows sharing a country code into one row per code holding an
/// embedded sequence of the original rows' fields.
///
/// The key column is excluded from the nested payload since it becomes the
/// output's grouping key. Rows with a null key (or the sentinel standing in
/// for one) are excluded from grouping. Output rows are ordered by key; rows
/// within a group keep source order. When `count_column` is given, each
/// output row also records its group's size.
pub fn nest_by_country(
    source: &Table,
    key_column: &str,
    payload_column: &str,
    count_column: Option<&str>,
) -> Result<Table> {
    let key_idx = source.require_column(key_column)?;

    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in source.rows() {
        let key = match &row[key_idx] {
            Value::Null => {
                skipped += 1;
                continue;
            }
            Value::String(code) if code == SENTINEL => {
                skipped += 1;
                continue;
            }
            Value::String(code) => code.clone(),
            Value::Number(code) => code.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let mut record = Map::new();
        for (idx, column) in source.columns().iter().enumerate() {
            if idx == key_idx {
                continue;
            }
            record.insert(column.clone(), row[idx].clone());
        }
        groups.entry(key).or_default().push(Value::Object(record));
    }
    if skipped > 0 {
        debug!(
            table = source.name(),
            skipped, "rows without a country code excluded from grouping"
        );
    }

    let mut columns = vec![key_column.to_string(), payload_column.to_string()];
    if let Some(count) = count_column {
        columns.push(count.to_string());
    }
    let mut nested = Table::new(format!("{}_nested", source.name()), columns);
    for (key, records) in groups {
        let count = records.len();
        let mut row = vec![Value::String(key), Value::Array(records)];
        if count_column.is_some() {
            row.push(Value::from(count as i64));
        }
        nested.push_row(row)?;
    }
    Ok(nested)
}
