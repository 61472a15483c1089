use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::{PipelineError, Result};

/// Sentinel written in place of missing values once a table has been cleaned.
pub const SENTINEL: &str = "Unknown";

/// An in-memory table: a header row plus typed cells.
///
/// The GDP source carries one column per year, so tables are dynamically
/// shaped rather than fixed structs. Cells are `serde_json::Value`: `Null`
/// for an empty source cell, `Number` for anything that parses as one,
/// `String` otherwise, and `Array`-of-`Object` for embedded collections
/// produced by nesting.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Read a CSV file, typing each cell as it is loaded.
    pub fn read_csv(path: &Path, name: &str) -> Result<Self> {
        Self::read_csv_skipping(path, name, 0)
    }

    /// Read a CSV file whose first `skip` lines are a non-tabular preamble.
    pub fn read_csv_skipping(path: &Path, name: &str, skip: usize) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        for _ in 0..skip {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
        }

        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut table = Table::new(name, columns);
        for record in csv_reader.records() {
            let record = record?;
            table.rows.push(record.iter().map(parse_cell).collect());
        }
        Ok(table)
    }

    /// Write the table as CSV, creating parent directories as needed.
    /// Embedded collections are serialized as JSON text within their cell.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            let rendered = row.iter().map(render_cell).collect::<Result<Vec<_>>>()?;
            writer.write_record(&rendered)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
                table: self.name.clone(),
            })
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::Shape(format!(
                "row with {} fields pushed into table '{}' with {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Project to exactly the named columns, erroring on any absent one.
    pub fn select(&self, wanted: &[&str]) -> Result<Table> {
        let indices = wanted
            .iter()
            .map(|column| self.require_column(column))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table {
            name: self.name.clone(),
            columns: wanted.iter().map(|column| column.to_string()).collect(),
            rows,
        })
    }

    /// Remove the named columns when present. The set difference between the
    /// requested columns and the actual ones is what gets dropped; absent
    /// members are not an error.
    pub fn drop_if_present(&mut self, unwanted: &[&str]) {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !unwanted.contains(&column.as_str()))
            .map(|(i, _)| i)
            .collect();
        if kept.len() == self.columns.len() {
            return;
        }
        let columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        self.columns = columns;
        for row in &mut self.rows {
            let slimmed = kept.iter().map(|&i| row[i].clone()).collect();
            *row = slimmed;
        }
    }

    /// Replace every top-level null cell with the sentinel. The interiors of
    /// embedded collections are left untouched.
    pub fn fill_missing(&mut self, sentinel: &str) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                if cell.is_null() {
                    *cell = Value::String(sentinel.to_string());
                }
            }
        }
    }

    pub fn append_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::Shape(format!(
                "column '{}' has {} values for {} rows in table '{}'",
                name,
                values.len(),
                self.rows.len(),
                self.name
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

/// Type a raw CSV cell: empty becomes null, numeric text becomes a number,
/// everything else stays a string.
fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::from(integer);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::String(raw.to_string())
}

fn render_cell(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(boolean) => boolean.to_string(),
        nested => serde_json::to_string(nested)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Table {
        let mut table = Table::new(
            "sample",
            vec!["code".to_string(), "name".to_string(), "value".to_string()],
        );
        table
            .push_row(vec![json!("USA"), json!("United States"), json!(10)])
            .unwrap();
        table
            .push_row(vec![json!("FRA"), Value::Null, json!(2.5)])
            .unwrap();
        table
    }

    #[test]
    fn test_parse_cell_types() {
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("  "), Value::Null);
        assert_eq!(parse_cell("42"), json!(42));
        assert_eq!(parse_cell("2.5"), json!(2.5));
        assert_eq!(parse_cell("USA"), json!("USA"));
    }

    #[test]
    fn test_select_enforces_schema() {
        let table = sample();
        let projected = table.select(&["name", "code"]).unwrap();
        assert_eq!(projected.columns(), &["name", "code"]);
        assert_eq!(projected.rows()[0][1], json!("USA"));

        let missing = table.select(&["code", "region"]);
        assert!(matches!(
            missing,
            Err(PipelineError::MissingColumn { column, .. }) if column == "region"
        ));
    }

    #[test]
    fn test_drop_if_present_tolerates_absent_columns() {
        let mut table = sample();
        table.drop_if_present(&["name", "no_such_column"]);
        assert_eq!(table.columns(), &["code", "value"]);
        assert_eq!(table.rows()[1], vec![json!("FRA"), json!(2.5)]);
    }

    #[test]
    fn test_fill_missing_replaces_only_nulls() {
        let mut table = sample();
        table.fill_missing(SENTINEL);
        assert_eq!(table.rows()[1][1], json!("Unknown"));
        assert_eq!(table.rows()[0][1], json!("United States"));
    }

    #[test]
    fn test_csv_round_trip_with_preamble_and_nested_cells() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gdp.csv");
        std::fs::write(
            &source,
            "Data Source,World Development Indicators\nLast Updated,2024\n\n\nCountry Code,2016\nUSA,1234.5\nFRA,\n",
        )
        .unwrap();

        let table = Table::read_csv_skipping(&source, "gdp", 4).unwrap();
        assert_eq!(table.columns(), &["Country Code", "2016"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], json!(1234.5));
        assert_eq!(table.rows()[1][1], Value::Null);

        let mut nested = Table::new(
            "nested",
            vec!["code".to_string(), "payload".to_string()],
        );
        nested
            .push_row(vec![json!("USA"), json!([{"year": 2016, "value": null}])])
            .unwrap();
        let out = dir.path().join("nested.csv");
        nested.write_csv(&out).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("\"\"year\"\":2016"));
    }
}
