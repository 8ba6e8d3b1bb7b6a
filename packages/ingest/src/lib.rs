#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the dashboard's static CSV files into an immutable [`Dataset`].
//!
//! Three files are read once at startup: the incident extract, population
//! by LSOA, and IMD scores by LSOA. Their names and the coverage window
//! come from a [`DatasetConfig`].

pub mod config;
pub mod incidents;
pub mod progress;
pub mod reference;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crime_dashboard_analytics::Dataset;
use crime_dashboard_analytics_models::InvalidCoverageError;
use crime_dashboard_geography_models::DuplicateAreaError;
use thiserror::Error;

pub use config::DatasetConfig;
pub use incidents::IncidentStats;
pub use progress::{NullProgress, ProgressCallback};

/// Errors that can occur while loading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or parsing a file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Open {
        /// File that could not be opened.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field held a value outside its domain.
    #[error("{file} line {line}: {message}")]
    Field {
        /// File the value came from.
        file: String,
        /// 1-based line number.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// A reference file lists the same area twice.
    #[error("{file}: {source}")]
    DuplicateArea {
        /// File the duplicate came from.
        file: String,
        /// The repeated area.
        #[source]
        source: DuplicateAreaError,
    },

    /// The dataset config could not be parsed.
    #[error("Invalid dataset config: {0}")]
    Config(#[from] toml::de::Error),

    /// The dataset config's coverage window is unusable.
    #[error("Invalid dataset config: {0}")]
    Coverage(#[from] InvalidCoverageError),
}

fn open(path: &Path) -> Result<BufReader<File>, IngestError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads all three input files from `data_dir`.
///
/// # Errors
///
/// Returns [`IngestError`] if any file is missing or malformed.
pub fn load_dataset(
    data_dir: &Path,
    config: &DatasetConfig,
    progress: &dyn ProgressCallback,
) -> Result<Dataset, IngestError> {
    log::info!("Loading dataset from {}", data_dir.display());

    let incidents_path = data_dir.join(&config.incidents_file);
    let (records, stats) = incidents::read_incidents(
        open(&incidents_path)?,
        &incidents_path.display().to_string(),
        progress,
    )?;

    let population_path = data_dir.join(&config.population_file);
    let population = reference::read_population(
        open(&population_path)?,
        &population_path.display().to_string(),
    )?;

    let deprivation_path = data_dir.join(&config.deprivation_file);
    let deprivation = reference::read_deprivation(
        open(&deprivation_path)?,
        &deprivation_path.display().to_string(),
    )?;

    log::info!(
        "Dataset ready: {} records ({} rows read, {} rollups skipped), {} population areas, {} IMD areas",
        records.len(),
        stats.rows_read,
        stats.rollups_skipped,
        population.len(),
        deprivation.len(),
    );

    Ok(Dataset::new(
        records,
        population,
        deprivation,
        config.coverage.clone(),
    ))
}
