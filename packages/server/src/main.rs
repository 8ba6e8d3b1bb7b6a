#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the crime dashboard API.
//!
//! Loads the dataset from `CRIME_DASHBOARD_DATA_DIR` using the embedded
//! dataset config, then serves it.

use std::sync::Arc;

use crime_dashboard_ingest::{DatasetConfig, NullProgress, config::data_dir_from_env};
use crime_dashboard_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DatasetConfig::embedded()?;
    let dataset = crime_dashboard_ingest::load_dataset(&data_dir_from_env(), &config, &NullProgress)?;

    run_server(Arc::new(dataset), ServerConfig::from_env()).await?;
    Ok(())
}
