use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::table::Table;

/// Number of descriptive lines preceding the header row in the GDP export.
pub const GDP_PREAMBLE_ROWS: usize = 4;

/// The raw source tables, loaded and typed but not yet cleaned.
pub struct SourceTables {
    pub athletes: Table,
    pub coaches: Option<Table>,
    pub medallists: Option<Table>,
    pub medals_total: Table,
    pub gdp: Table,
    pub country: Table,
}

pub fn load_sources(config: &PipelineConfig) -> Result<SourceTables> {
    let inputs = &config.inputs;

    let athletes = Table::read_csv(&inputs.athletes, "athletes")?;
    info!(rows = athletes.len(), "loaded athletes");

    let coaches = load_optional(inputs.coaches.as_deref(), "coaches")?;
    let medallists = load_optional(inputs.medallists.as_deref(), "medallists")?;

    let medals_total = Table::read_csv(&inputs.medals_total, "medals_total")?;
    info!(rows = medals_total.len(), "loaded medal totals");

    let gdp = Table::read_csv_skipping(&inputs.gdp, "gdp", GDP_PREAMBLE_ROWS)?;
    info!(rows = gdp.len(), "loaded GDP data");

    let country = Table::read_csv(&inputs.country, "country")?;
    info!(rows = country.len(), "loaded country metadata");

    Ok(SourceTables {
        athletes,
        coaches,
        medallists,
        medals_total,
        gdp,
        country,
    })
}

/// Coaches and medallists carry no downstream contract; a configured path is
/// loaded and logged, an unconfigured one is skipped.
fn load_optional(path: Option<&Path>, name: &str) -> Result<Option<Table>> {
    match path {
        Some(path) => {
            let table = Table::read_csv(path, name)?;
            info!(rows = table.len(), table = name, "loaded auxiliary table");
            Ok(Some(table))
        }
        None => {
            debug!(table = name, "no path configured, skipping");
            Ok(None)
        }
    }
}
