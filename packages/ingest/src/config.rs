//! Dataset layout configuration.
//!
//! The default layout is embedded at compile time from `dataset.toml`;
//! a different file can be supplied at runtime. Missing keys fall back to
//! the defaults.

use std::path::{Path, PathBuf};

use crime_dashboard_analytics_models::CoverageWindow;
use serde::{Deserialize, Serialize};

use crate::IngestError;

/// Embedded default layout.
const DEFAULT_DATASET_TOML: &str = include_str!("../dataset.toml");

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "CRIME_DASHBOARD_DATA_DIR";

/// Data directory used when [`DATA_DIR_ENV`] is unset.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Names of the input files and the coverage window they span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Incident CSV, relative to the data directory.
    pub incidents_file: PathBuf,
    /// Population CSV, relative to the data directory.
    pub population_file: PathBuf,
    /// IMD score CSV, relative to the data directory.
    pub deprivation_file: PathBuf,
    /// Months each year selection spans.
    pub coverage: CoverageWindow,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            incidents_file: PathBuf::from("final_df.csv"),
            population_file: PathBuf::from("population.csv"),
            deprivation_file: PathBuf::from("imd_scores.csv"),
            coverage: CoverageWindow::default(),
        }
    }
}

impl DatasetConfig {
    /// Parses a layout from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the TOML is malformed and
    /// [`IngestError::Coverage`] if a coverage entry spans zero months.
    pub fn from_toml_str(s: &str) -> Result<Self, IngestError> {
        let config: Self = toml::from_str(s)?;
        config.coverage.validate()?;
        Ok(config)
    }

    /// The layout embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, IngestError> {
        Self::from_toml_str(DEFAULT_DATASET_TOML)
    }

    /// Reads a layout from `path`, or the embedded one when `path` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, IngestError> {
        match path {
            Some(path) => {
                log::info!("Reading dataset config from {}", path.display());
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml_str(&contents)
            }
            None => Self::embedded(),
        }
    }
}

/// Data directory from [`DATA_DIR_ENV`], falling back to
/// [`DEFAULT_DATA_DIR`].
#[must_use]
pub fn data_dir_from_env() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV).map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
}
