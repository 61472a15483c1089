use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use olympics_dataprep::config::PipelineConfig;
use olympics_dataprep::logging;
use olympics_dataprep::pipeline::{self, PipelineReport};

#[derive(Parser)]
#[command(name = "olympics_dataprep")]
#[command(about = "Olympics 2024 athlete, medal, country, and GDP data preparation")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the pipeline configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full cleaning and merging pipeline (the default)
    Run,
    /// Clean only the athlete dataset
    Athletes,
    /// Clean only the GDP dataset
    Gdp,
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = PipelineConfig::resolve(cli.config.as_deref())?;

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            println!("🔄 Running data cleaning and merging pipeline...");
            pipeline::run(&config)
        }
        Commands::Athletes => {
            println!("🔄 Cleaning athlete data...");
            pipeline::run_athletes(&config)
        }
        Commands::Gdp => {
            println!("🔄 Cleaning GDP data...");
            pipeline::run_gdp(&config)
        }
    };

    match result {
        Ok(report) => {
            report_success(&report);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            println!("❌ Pipeline run failed: {}", e);
            Err(e.into())
        }
    }
}

fn report_success(report: &PipelineReport) {
    println!("✔ Data cleaning and merging complete.");
    if report.countries > 0 {
        println!("   Countries in merged output: {}", report.countries);
    }
    if report.athletes > 0 {
        println!("   Athletes cleaned: {}", report.athletes);
    }
    println!("✔ Files saved:");
    for file in &report.files {
        println!("- {}", file.display());
    }
}
