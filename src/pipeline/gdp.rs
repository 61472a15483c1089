use serde_json::Value;

use crate::error::Result;
use crate::table::{Table, SENTINEL};

/// Descriptive columns carried by the World Bank export but useless here.
const GDP_DROP_COLUMNS: [&str; 2] = ["Indicator Name", "Indicator Code"];
const COUNTRY_DROP_COLUMNS: [&str; 1] = ["TableName"];
/// Name columns duplicated from country metadata.
const MEDALS_DROP_COLUMNS: [&str; 2] = ["country_long", "country"];

/// Columns of the narrow historical-comparison extract.
const RECENT_COLUMNS: [&str; 4] = ["Country Code", "Country Name", "2016", "2024"];

/// Year columns start after country code and name.
const CURRENCY_START_COLUMN: usize = 2;

/// The cleaned full GDP table and the narrow two-year extract.
pub struct GdpTables {
    pub full: Table,
    pub recent: Table,
}

/// Clean the GDP table: drop descriptive columns, cut the narrow extract,
/// substitute missing values, then render every numeric cell as currency.
/// Substitution runs before formatting, so sentinel cells are never
/// reformatted.
pub fn clean_gdp(mut gdp: Table) -> Result<GdpTables> {
    gdp.drop_if_present(&GDP_DROP_COLUMNS);
    let mut recent = gdp.select(&RECENT_COLUMNS)?;

    gdp.fill_missing(SENTINEL);
    recent.fill_missing(SENTINEL);

    format_currency_columns(&mut gdp, CURRENCY_START_COLUMN);
    format_currency_columns(&mut recent, CURRENCY_START_COLUMN);

    Ok(GdpTables { full: gdp, recent })
}

pub fn clean_country(country: &mut Table) {
    country.drop_if_present(&COUNTRY_DROP_COLUMNS);
}

pub fn clean_medal_totals(totals: &mut Table) {
    totals.drop_if_present(&MEDALS_DROP_COLUMNS);
}

/// Render numeric cells as currency strings in every column from `start`
/// onward. Columns are classified once: a column is touched only when it
/// holds at least one numeric cell, and within it only numeric cells are
/// rewritten, so already-stringified cells pass through byte-identical.
pub fn format_currency_columns(table: &mut Table, start: usize) {
    let numeric: Vec<usize> = (start..table.columns().len())
        .filter(|&idx| table.rows().iter().any(|row| row[idx].is_number()))
        .collect();

    for row in table.rows_mut() {
        for &idx in &numeric {
            if let Some(value) = row[idx].as_f64() {
                row[idx] = Value::String(format_currency(value));
            }
        }
    }
}

/// `1234567.5` becomes `$1,234,567.50`: leading dollar sign, thousands
/// separators, exactly two decimals.
pub fn format_currency(value: f64) -> String {
    let mut digits = format!("{:.2}", value.abs());
    let fraction = digits.split_off(digits.len() - 3);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("${sign}{grouped}{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gdp_table() -> Table {
        let mut table = Table::new(
            "gdp",
            vec![
                "Country Name".to_string(),
                "Country Code".to_string(),
                "Indicator Name".to_string(),
                "Indicator Code".to_string(),
                "2016".to_string(),
                "2024".to_string(),
            ],
        );
        table
            .push_row(vec![
                json!("United States"),
                json!("USA"),
                json!("GDP (current US$)"),
                json!("NY.GDP.MKTP.CD"),
                json!(1234567.5),
                Value::Null,
            ])
            .unwrap();
        table
            .push_row(vec![
                json!("France"),
                json!("FRA"),
                json!("GDP (current US$)"),
                json!("NY.GDP.MKTP.CD"),
                json!(1000),
                json!(2000.25),
            ])
            .unwrap();
        table
    }

    #[test]
    fn test_format_currency_examples() {
        assert_eq!(format_currency(1234567.5), "$1,234,567.50");
        assert_eq!(format_currency(1000.0), "$1,000.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(-1234.5), "$-1,234.50");
    }

    #[test]
    fn test_clean_gdp_formats_and_fills() {
        let GdpTables { full, recent } = clean_gdp(gdp_table()).unwrap();

        assert_eq!(full.columns(), &["Country Name", "Country Code", "2016", "2024"]);
        let y2016 = full.column_index("2016").unwrap();
        let y2024 = full.column_index("2024").unwrap();
        assert_eq!(full.rows()[0][y2016], json!("$1,234,567.50"));
        assert_eq!(full.rows()[0][y2024], json!("Unknown"));
        assert_eq!(full.rows()[1][y2016], json!("$1,000.00"));
        assert_eq!(full.rows()[1][y2024], json!("$2,000.25"));

        assert_eq!(recent.columns(), &["Country Code", "Country Name", "2016", "2024"]);
        assert_eq!(recent.len(), full.len());
    }

    #[test]
    fn test_formatting_leaves_sentinel_cells_byte_identical() {
        let mut table = Table::new(
            "gdp",
            vec!["Country Code".to_string(), "Country Name".to_string(), "2016".to_string()],
        );
        table
            .push_row(vec![json!("USA"), json!("United States"), json!("Unknown")])
            .unwrap();
        table
            .push_row(vec![json!("FRA"), json!("France"), json!(5.0)])
            .unwrap();

        format_currency_columns(&mut table, CURRENCY_START_COLUMN);
        assert_eq!(table.rows()[0][2], json!("Unknown"));
        assert_eq!(table.rows()[1][2], json!("$5.00"));
    }

    #[test]
    fn test_all_string_column_is_never_classified_numeric() {
        let mut table = Table::new(
            "gdp",
            vec!["Country Code".to_string(), "Country Name".to_string(), "note".to_string()],
        );
        table
            .push_row(vec![json!("USA"), json!("United States"), json!("estimate")])
            .unwrap();
        format_currency_columns(&mut table, CURRENCY_START_COLUMN);
        assert_eq!(table.rows()[0][2], json!("estimate"));
    }

    #[test]
    fn test_clean_medal_totals_drops_duplicate_names() {
        let mut totals = Table::new(
            "medals_total",
            vec![
                "country_code".to_string(),
                "country_long".to_string(),
                "country".to_string(),
                "Total".to_string(),
            ],
        );
        totals
            .push_row(vec![json!("USA"), json!("United States"), json!("USA"), json!(126)])
            .unwrap();
        clean_medal_totals(&mut totals);
        assert_eq!(totals.columns(), &["country_code", "Total"]);
    }
}
