// Data preparation pipeline: load, normalize, nest, merge, write

pub mod athletes;
pub mod gdp;
pub mod loader;
pub mod merge;
pub mod nest;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::table::{Table, SENTINEL};

use self::gdp::GdpTables;
use self::loader::SourceTables;

/// What a pipeline run produced, for reporting back to the operator.
pub struct PipelineReport {
    pub files: Vec<PathBuf>,
    pub countries: usize,
    pub athletes: usize,
}

/// Execute the full pipeline: load the sources, clean athletes and GDP,
/// nest both by country, merge everything onto the country metadata, and
/// write the five output files.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let SourceTables {
        athletes: raw_athletes,
        medals_total,
        gdp: raw_gdp,
        country,
        ..
    } = loader::load_sources(config)?;

    info!("normalizing athlete data");
    let athletes = athletes::normalize(&raw_athletes)?;

    info!("cleaning GDP and reference tables");
    let mut country = country;
    let mut medals_total = medals_total;
    gdp::clean_country(&mut country);
    gdp::clean_medal_totals(&mut medals_total);
    let GdpTables {
        full: gdp_full,
        recent: gdp_recent,
    } = gdp::clean_gdp(raw_gdp)?;

    info!("nesting athletes and GDP by country");
    let nested_athletes = nest::nest_by_country(
        &athletes,
        "country_code",
        "athletes_data",
        Some("amount_of_athletes"),
    )?;
    let nested_gdp = nest::nest_by_country(&gdp_full, "Country Code", "gdp_data", None)?;

    info!("merging datasets onto country metadata");
    let mut merged = merge::left_join(&country, &nested_gdp, "Country Code", "Country Code")?;
    merged = merge::left_join(&merged, &medals_total, "Country Code", "country_code")?;
    merged = merge::left_join(&merged, &nested_athletes, "Country Code", "country_code")?;
    merged.drop_if_present(&["country_code_x", "country_code_y"]);
    merged.fill_missing(SENTINEL);

    let outputs = &config.outputs;
    let mut files = Vec::new();
    write_output(&merged, &outputs.merged, &mut files)?;
    write_output(&gdp_full, &outputs.gdp, &mut files)?;
    write_output(&gdp_recent, &outputs.gdp_recent, &mut files)?;
    write_output(&athletes, &outputs.athletes, &mut files)?;
    // Copy for the visualization import; no denormalization happens yet
    write_output(&merged, &outputs.merged_flat, &mut files)?;

    Ok(PipelineReport {
        files,
        countries: merged.len(),
        athletes: athletes.len(),
    })
}

/// Clean only the athlete dataset and write its output file.
pub fn run_athletes(config: &PipelineConfig) -> Result<PipelineReport> {
    let raw = Table::read_csv(&config.inputs.athletes, "athletes")?;
    info!(rows = raw.len(), "loaded athletes");
    let athletes = athletes::normalize(&raw)?;

    let mut files = Vec::new();
    write_output(&athletes, &config.outputs.athletes, &mut files)?;
    Ok(PipelineReport {
        files,
        countries: 0,
        athletes: athletes.len(),
    })
}

/// Clean only the GDP dataset and write the full table plus the narrow
/// two-year extract.
pub fn run_gdp(config: &PipelineConfig) -> Result<PipelineReport> {
    let raw = Table::read_csv_skipping(&config.inputs.gdp, "gdp", loader::GDP_PREAMBLE_ROWS)?;
    info!(rows = raw.len(), "loaded GDP data");
    let GdpTables { full, recent } = gdp::clean_gdp(raw)?;

    let mut files = Vec::new();
    write_output(&full, &config.outputs.gdp, &mut files)?;
    write_output(&recent, &config.outputs.gdp_recent, &mut files)?;
    Ok(PipelineReport {
        files,
        countries: full.len(),
        athletes: 0,
    })
}

fn write_output(table: &Table, path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    table.write_csv(path)?;
    info!(rows = table.len(), file = %path.display(), "wrote output");
    files.push(path.to_path_buf());
    Ok(())
}
