use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::table::Table;

/// Left join on country code: every left row is preserved, unmatched right
/// columns come back null.
///
/// When both keys share a name the right key column is merged away, as in a
/// join `on` a common column. Otherwise the right key column is kept, and a
/// right column whose name collides with an existing one gets the `_y`
/// suffix while the existing column gets `_x`.
pub fn left_join(left: &Table, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
    let left_idx = left.require_column(left_key)?;
    let right_idx = right.require_column(right_key)?;

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows().iter().enumerate() {
        if let Some(key) = join_key(&row[right_idx]) {
            index.entry(key).or_default().push(row_idx);
        }
    }

    let same_key = left_key == right_key;
    let kept: Vec<usize> = (0..right.columns().len())
        .filter(|&idx| !(same_key && idx == right_idx))
        .collect();

    let mut columns: Vec<String> = left.columns().to_vec();
    let mut incoming: Vec<String> = kept
        .iter()
        .map(|&idx| right.columns()[idx].clone())
        .collect();
    for name in incoming.iter_mut() {
        if let Some(pos) = columns.iter().position(|existing| existing == name) {
            columns[pos] = format!("{name}_x");
            *name = format!("{name}_y");
        }
    }
    columns.extend(incoming);

    let mut joined = Table::new(left.name(), columns);
    for row in left.rows() {
        let matches = join_key(&row[left_idx]).and_then(|key| index.get(&key));
        match matches {
            Some(right_rows) => {
                for &right_row in right_rows {
                    let mut out = row.clone();
                    out.extend(kept.iter().map(|&idx| right.rows()[right_row][idx].clone()));
                    joined.push_row(out)?;
                }
            }
            None => {
                let mut out = row.clone();
                out.extend(std::iter::repeat(Value::Null).take(kept.len()));
                joined.push_row(out)?;
            }
        }
    }
    Ok(joined)
}

fn join_key(cell: &Value) -> Option<String> {
    match cell {
        Value::String(key) => Some(key.clone()),
        Value::Number(key) => Some(key.to_string()),
        _ => None,
    }
}
