#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter-and-aggregate pipeline for the crime dashboard.
//!
//! Every view is a pure function of the immutable [`Dataset`] and a query:
//! filter the incident records, optionally join population to turn counts
//! into rates, then group and order the result for rendering. Nothing is
//! cached between calls, so concurrent requests can share one
//! `Arc<Dataset>` freely.

pub mod aggregate;
pub mod deprivation;
pub mod map;
mod metric;
pub mod time_series;

use crime_dashboard_analytics_models::{CoverageWindow, MapCenter, RecordFilters};
use crime_dashboard_crime_models::IncidentRecord;
use crime_dashboard_geography_models::{DeprivationTable, InvalidPopulationError, PopulationTable};
use thiserror::Error;

pub use aggregate::aggregate;
pub use deprivation::deprivation_scatter;
pub use map::map_points;
pub use metric::rate_per_1000;
pub use time_series::time_series;

/// Errors that can occur while running a query.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A population value needed for a rate is not a whole number.
    #[error("Invalid population: {0}")]
    InvalidPopulation(#[from] InvalidPopulationError),
}

/// Degrees added to the mean latitude when framing the map.
pub const MAP_CENTER_LATITUDE_OFFSET: f64 = 0.05;

/// The in-memory dataset every query runs against.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<IncidentRecord>,
    population: PopulationTable,
    deprivation: DeprivationTable,
    coverage: CoverageWindow,
}

impl Dataset {
    /// Bundles loaded records and reference tables.
    #[must_use]
    pub const fn new(
        records: Vec<IncidentRecord>,
        population: PopulationTable,
        deprivation: DeprivationTable,
        coverage: CoverageWindow,
    ) -> Self {
        Self {
            records,
            population,
            deprivation,
            coverage,
        }
    }

    /// All incident records, in file order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Population reference table.
    #[must_use]
    pub const fn population(&self) -> &PopulationTable {
        &self.population
    }

    /// Deprivation score reference table.
    #[must_use]
    pub const fn deprivation(&self) -> &DeprivationTable {
        &self.deprivation
    }

    /// Months covered by each year selection.
    #[must_use]
    pub const fn coverage(&self) -> &CoverageWindow {
        &self.coverage
    }

    /// Records passing `filters`, in file order.
    pub fn filtered<'a>(
        &'a self,
        filters: &'a RecordFilters,
    ) -> impl Iterator<Item = &'a IncidentRecord> + 'a {
        self.records.iter().filter(move |r| filters.matches(r))
    }

    /// Distinct years present in the records, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let years: std::collections::BTreeSet<i32> =
            self.records.iter().map(IncidentRecord::year).collect();
        years.into_iter().collect()
    }

    /// Map framing point: the mean location of every record, nudged north
    /// by [`MAP_CENTER_LATITUDE_OFFSET`]. `None` for an empty dataset.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> Option<MapCenter> {
        if self.records.is_empty() {
            return None;
        }
        let n = self.records.len() as f64;
        let (lat, lon) = self
            .records
            .iter()
            .fold((0.0, 0.0), |(lat, lon), r| (lat + r.latitude, lon + r.longitude));
        Some(MapCenter {
            latitude: lat / n + MAP_CENTER_LATITUDE_OFFSET,
            longitude: lon / n,
        })
    }
}

/// Rounds to two decimal places, halves to even.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crime_dashboard_analytics_models::CoverageWindow;
    use crime_dashboard_crime_models::{
        CrimeType, DeprivationDecile, District, IncidentRecord, LsoaCode, Period,
    };
    use crime_dashboard_geography_models::{
        DeprivationScore, DeprivationTable, PopulationTable,
    };

    use crate::Dataset;

    pub fn record(
        lsoa: &str,
        crime_type: CrimeType,
        year: i32,
        month: u32,
        district: District,
        decile: u8,
        count: u64,
    ) -> IncidentRecord {
        IncidentRecord {
            lsoa_code: LsoaCode::new(lsoa),
            crime_type,
            period: Period::new(year, month).unwrap(),
            district,
            decile: DeprivationDecile::from_value(decile).unwrap(),
            latitude: 53.7,
            longitude: -2.6,
            crime_count: count,
        }
    }

    /// Four areas: A and B have populations, C has zero population, D has
    /// no population entry at all.
    pub fn dataset() -> Dataset {
        let records = vec![
            record("A", CrimeType::Burglary, 2020, 1, District::Preston, 1, 4),
            record("A", CrimeType::Burglary, 2020, 2, District::Preston, 1, 0),
            record("B", CrimeType::Burglary, 2020, 1, District::Chorley, 7, 2),
            record("A", CrimeType::Drugs, 2020, 1, District::Preston, 1, 1),
            record("B", CrimeType::Burglary, 2021, 3, District::Chorley, 7, 5),
            record("C", CrimeType::Burglary, 2020, 3, District::Wyre, 9, 3),
            record("D", CrimeType::Robbery, 2019, 11, District::Fylde, 4, 6),
            record("B", CrimeType::Shoplifting, 2022, 6, District::Chorley, 7, 8),
        ];
        let population = PopulationTable::from_entries([
            (LsoaCode::new("A"), "2,000".to_string()),
            (LsoaCode::new("B"), "1000".to_string()),
            (LsoaCode::new("C"), "0".to_string()),
        ])
        .unwrap();
        let deprivation = DeprivationTable::from_entries([
            (
                LsoaCode::new("A"),
                DeprivationScore {
                    score: 55.2,
                    decile: DeprivationDecile::from_value(1).ok(),
                },
            ),
            (
                LsoaCode::new("B"),
                DeprivationScore {
                    score: 8.4,
                    decile: DeprivationDecile::from_value(7).ok(),
                },
            ),
        ])
        .unwrap();
        Dataset::new(records, population, deprivation, CoverageWindow::default())
    }
}
