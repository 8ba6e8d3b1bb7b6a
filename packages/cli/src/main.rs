#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the crime dashboard.
//!
//! Loads the dataset once, then either serves the JSON API or runs a
//! single query and prints the result as JSON. Uses
//! `indicatif-log-bridge` (via [`crime_dashboard_cli_utils::init_logger`])
//! so the load spinner and log lines never fight for the terminal.

mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use crime_dashboard_analytics::Dataset;
use crime_dashboard_cli_utils::{IndicatifProgress, MultiProgress};
use crime_dashboard_ingest::{DatasetConfig, config::data_dir_from_env};
use crime_dashboard_server::ServerConfig;
use crime_dashboard_server_models::{AggregateParams, FilterParams, TimeSeriesParams};

#[derive(Parser)]
#[command(name = "crime_dashboard", about = "Lancashire crime dashboard")]
struct Cli {
    /// Directory holding the input CSV files (overrides
    /// `CRIME_DASHBOARD_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Dataset config TOML (defaults to the embedded layout)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API (reads `BIND_ADDR` and `PORT`)
    Serve,
    /// Group filtered records and print summary rows
    Aggregate {
        #[command(flatten)]
        filters: FilterArgs,
        /// `crime_type`, `district`, `decile` or `period`
        #[arg(long, default_value = "crime_type")]
        group_by: String,
        /// `count`, `rate` or `monthly_rate`
        #[arg(long, default_value = "count")]
        metric: String,
        /// Ignore the filter on the grouped dimension
        #[arg(long)]
        breakdown: bool,
    },
    /// Print a monthly time series
    Timeseries {
        /// Crime type, or "Total Crime"
        #[arg(long)]
        crime_type: Option<String>,
        /// District, or "All Districts"
        #[arg(long)]
        district: Option<String>,
        /// Deprivation decile, or "All Deprivation Deciles"
        #[arg(long)]
        decile: Option<String>,
        /// Split into one line per `crime_type` or `district`
        #[arg(long)]
        split: Option<String>,
        /// `count`, `rate` or `monthly_rate`
        #[arg(long, default_value = "count")]
        metric: String,
    },
    /// Load the input files and report how well they join
    Validate,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Crime type, or "Total Crime"
    #[arg(long)]
    crime_type: Option<String>,
    /// Year, or "All years"
    #[arg(long)]
    year: Option<String>,
    /// District, or "All Districts"
    #[arg(long)]
    district: Option<String>,
    /// Deprivation decile, or "All Deprivation Deciles"
    #[arg(long)]
    decile: Option<String>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        Self {
            crime_type: args.crime_type,
            year: args.year,
            district: args.district,
            decile: args.decile,
        }
    }
}

fn load(cli: &Cli, multi: &MultiProgress) -> Result<Dataset, Box<dyn std::error::Error>> {
    let config = DatasetConfig::load(cli.config.as_deref())?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(data_dir_from_env);
    let progress = IndicatifProgress::rows_spinner(multi, "Loading incidents");
    Ok(crime_dashboard_ingest::load_dataset(
        &data_dir,
        &config,
        progress.as_ref(),
    )?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();
    let dataset = load(&cli, &multi)?;

    match cli.command {
        Commands::Serve => {
            let config = ServerConfig::from_env();
            actix_rt::System::new()
                .block_on(crime_dashboard_server::run_server(Arc::new(dataset), config))?;
        }
        Commands::Aggregate {
            filters,
            group_by,
            metric,
            breakdown,
        } => {
            let params = AggregateParams {
                filters: filters.into(),
                group_by: Some(group_by),
                metric: Some(metric),
            };
            let mut query = params.to_query()?;
            if breakdown {
                query = query.breakdown();
            }
            print_json(&crime_dashboard_analytics::aggregate(&dataset, &query)?)?;
        }
        Commands::Timeseries {
            crime_type,
            district,
            decile,
            split,
            metric,
        } => {
            let params = TimeSeriesParams {
                crime_type,
                district,
                decile,
                split,
                metric: Some(metric),
            };
            let query = params.to_query()?.relaxed();
            print_json(&crime_dashboard_analytics::time_series(&dataset, &query)?)?;
        }
        Commands::Validate => {
            let report = validate::validate(&dataset);
            validate::print(&report);
            if !report.is_clean() {
                log::warn!("Input files do not join cleanly");
            }
        }
    }

    Ok(())
}
