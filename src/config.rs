use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// All file locations the pipeline reads and writes, grouped in one struct
/// passed into the pipeline entry point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    pub athletes: PathBuf,
    /// Optional input with no downstream contract; loaded only when set.
    pub coaches: Option<PathBuf>,
    /// Optional input with no downstream contract; loaded only when set.
    pub medallists: Option<PathBuf>,
    pub medals_total: PathBuf,
    pub gdp: PathBuf,
    pub country: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub merged: PathBuf,
    /// Copy of the merged dataset kept for the visualization import. No
    /// flattening of the nested columns happens yet, so it is byte-identical
    /// to `merged`.
    pub merged_flat: PathBuf,
    pub gdp: PathBuf,
    pub gdp_recent: PathBuf,
    pub athletes: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            athletes: PathBuf::from("data/athletes.csv"),
            coaches: None,
            medallists: None,
            medals_total: PathBuf::from("data/medals_total.csv"),
            gdp: PathBuf::from("data/gdp.csv"),
            country: PathBuf::from("data/country_metadata.csv"),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            merged: PathBuf::from("output/merged_data.csv"),
            merged_flat: PathBuf::from("output/merged_data_clean.csv"),
            gdp: PathBuf::from("output/gdp_data.csv"),
            gdp_recent: PathBuf::from("output/new_gdp_data.csv"),
            athletes: PathBuf::from("output/athletes_data.csv"),
        }
    }
}

impl PipelineConfig {
    pub const DEFAULT_PATH: &'static str = "config.toml";

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the effective configuration: an explicitly given file must
    /// exist; otherwise `config.toml` is used when present, and the built-in
    /// default paths when not.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(Self::DEFAULT_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [inputs]
            athletes = "custom/athletes.csv"
            coaches = "custom/coaches.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.inputs.athletes, PathBuf::from("custom/athletes.csv"));
        assert_eq!(
            config.inputs.coaches.as_deref(),
            Some(Path::new("custom/coaches.csv"))
        );
        assert_eq!(config.inputs.gdp, PathBuf::from("data/gdp.csv"));
        assert_eq!(config.outputs.merged, PathBuf::from("output/merged_data.csv"));
    }

    #[test]
    fn test_resolve_missing_explicit_path_errors() {
        let result = PipelineConfig::resolve(Some(Path::new("no/such/config.toml")));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
