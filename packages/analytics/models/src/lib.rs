#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query and result types for the dashboard aggregation pipeline.
//!
//! Each view of the dashboard (bar/pie breakdown, time series, map,
//! deprivation scatter) has a query type built from dropdown
//! [`Selection`]s and a result type shaped for the renderer:
//! `(category, value)` rows or `(period, value, series)` points.

pub mod selection;

use crime_dashboard_crime_models::{
    CrimeType, DeprivationDecile, District, IncidentRecord, LsoaCode,
};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use selection::{Selection, SelectionDomain};

/// Conjunctive filter over the incident dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordFilters {
    /// Crime type, or `"Total Crime"` for all.
    pub crime_type: Selection<CrimeType>,
    /// Year, or `"All years"`.
    pub year: Selection<i32>,
    /// District, or `"All Districts"`.
    pub district: Selection<District>,
    /// IMD decile, or `"All Deprivation Deciles"`.
    pub decile: Selection<DeprivationDecile>,
}

impl RecordFilters {
    /// Whether `record` passes every predicate.
    #[must_use]
    pub fn matches(&self, record: &IncidentRecord) -> bool {
        self.crime_type.matches(&record.crime_type)
            && self.year.matches(&record.year())
            && self.district.matches(&record.district)
            && self.decile.matches(&record.decile)
    }
}

/// Dimension that summary rows are grouped by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupBy {
    /// One row per crime type.
    CrimeType,
    /// One row per district.
    District,
    /// One row per deprivation decile.
    Decile,
    /// One row per calendar month, labelled `YYYY-MM`.
    Period,
}

impl GroupBy {
    /// Whether rows are ordered chronologically instead of by value.
    #[must_use]
    pub const fn is_chronological(self) -> bool {
        matches!(self, Self::Period)
    }
}

/// Value computed for each record before grouping.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Metric {
    /// Raw crime count.
    #[default]
    #[serde(rename = "count")]
    #[strum(serialize = "count")]
    Count,
    /// Crimes per 1,000 residents.
    #[serde(rename = "rate")]
    #[strum(serialize = "rate")]
    RatePer1000,
    /// Crimes per 1,000 residents per month of data covered.
    #[serde(rename = "monthly_rate")]
    #[strum(serialize = "monthly_rate")]
    MonthlyRate,
}

impl Metric {
    /// Whether computing this metric needs the population join.
    #[must_use]
    pub const fn requires_population(self) -> bool {
        matches!(self, Self::RatePer1000 | Self::MonthlyRate)
    }
}

/// Dimension that splits a time series into several lines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeriesSplit {
    /// One line per crime type.
    CrimeType,
    /// One line per district.
    District,
}

/// Number of months of data a year contributes, used to turn a rate into a
/// per-month rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearCoverage {
    /// Calendar year.
    pub year: i32,
    /// Months of that year present in the dataset.
    pub months: u32,
}

/// How many months each year selection spans.
///
/// The default matches the published dataset, which runs from October 2019
/// to September 2022.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CoverageWindow {
    /// Years that are only partially covered.
    pub partial_years: Vec<YearCoverage>,
    /// Months for any other single year.
    pub full_year_months: u32,
    /// Months for the "All years" selection.
    pub all_years_months: u32,
}

impl Default for CoverageWindow {
    fn default() -> Self {
        Self {
            partial_years: vec![
                YearCoverage {
                    year: 2019,
                    months: 3,
                },
                YearCoverage {
                    year: 2022,
                    months: 9,
                },
            ],
            full_year_months: 12,
            all_years_months: 36,
        }
    }
}

/// Error returned when a [`CoverageWindow`] gives a selection zero months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCoverageError {
    /// The selection with no months (`"all years"`, `"full year"`, or a
    /// year).
    pub selection: String,
}

impl std::fmt::Display for InvalidCoverageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "coverage for {} must span at least one month",
            self.selection
        )
    }
}

impl std::error::Error for InvalidCoverageError {}

impl CoverageWindow {
    /// Checks that every selection spans at least one month.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoverageError`] naming the first selection with a
    /// zero month count.
    pub fn validate(&self) -> Result<(), InvalidCoverageError> {
        if self.all_years_months == 0 {
            return Err(InvalidCoverageError {
                selection: "all years".to_string(),
            });
        }
        if self.full_year_months == 0 {
            return Err(InvalidCoverageError {
                selection: "full year".to_string(),
            });
        }
        match self.partial_years.iter().find(|c| c.months == 0) {
            Some(c) => Err(InvalidCoverageError {
                selection: c.year.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Months spanned by a year selection.
    #[must_use]
    pub fn months_for(&self, year: &Selection<i32>) -> u32 {
        match year {
            Selection::All => self.all_years_months,
            Selection::Only(y) => self
                .partial_years
                .iter()
                .find(|c| c.year == *y)
                .map_or(self.full_year_months, |c| c.months),
            Selection::Unknown(_) => self.full_year_months,
        }
    }
}

/// Parameters for a grouped summary (bar and pie charts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateQuery {
    /// Record filters.
    pub filters: RecordFilters,
    /// Grouping dimension.
    pub group_by: GroupBy,
    /// Per-record metric.
    pub metric: Metric,
}

impl AggregateQuery {
    /// Returns a copy with the filter on the grouped dimension reset to
    /// "all", so grouping by district shows every district even when one is
    /// selected in the dropdown.
    #[must_use]
    pub fn breakdown(&self) -> Self {
        let mut query = self.clone();
        match self.group_by {
            GroupBy::CrimeType => query.filters.crime_type = Selection::All,
            GroupBy::District => query.filters.district = Selection::All,
            GroupBy::Decile | GroupBy::Period => {}
        }
        query
    }
}

/// One `(category, value)` row of a grouped summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// Group label (crime type, district, decile, or `YYYY-MM`).
    pub key: String,
    /// Aggregated metric value.
    pub value: f64,
}

/// Records dropped while joining against a reference table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    /// Rows whose area had no reference entry.
    pub unmatched_rows: u64,
    /// Rows whose area has a population of zero.
    pub zero_population_rows: u64,
    /// Distinct areas with no reference entry, sorted.
    pub unmatched_areas: Vec<LsoaCode>,
}

impl JoinReport {
    /// Whether any row was excluded.
    #[must_use]
    pub const fn has_exclusions(&self) -> bool {
        self.unmatched_rows > 0 || self.zero_population_rows > 0
    }
}

/// Result of a grouped summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Summary rows, by descending value or chronologically.
    pub rows: Vec<SummaryRow>,
    /// Sum of all row values.
    pub total: f64,
    /// Months divisor applied for [`Metric::MonthlyRate`].
    pub months_divisor: Option<u32>,
    /// Rows excluded by the population join.
    pub join: JoinReport,
}

/// Parameters for a monthly time series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesQuery {
    /// Record filters.
    pub filters: RecordFilters,
    /// Optional split into one line per crime type or district.
    pub split: Option<SeriesSplit>,
    /// Per-record metric.
    pub metric: Metric,
}

impl TimeSeriesQuery {
    /// Returns a copy with the filter on the split dimension reset to "all".
    #[must_use]
    pub fn relaxed(&self) -> Self {
        let mut query = self.clone();
        match self.split {
            Some(SeriesSplit::CrimeType) => query.filters.crime_type = Selection::All,
            Some(SeriesSplit::District) => query.filters.district = Selection::All,
            None => {}
        }
        query
    }
}

/// One point of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Month label, `YYYY-MM`.
    pub period: String,
    /// Series label when the query was split.
    pub series: Option<String>,
    /// Aggregated metric value.
    pub value: f64,
}

/// Result of a time-series query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesResult {
    /// Points ordered by period, then series label.
    pub points: Vec<TimeSeriesPoint>,
    /// Rows excluded by the population join.
    pub join: JoinReport,
}

/// Parameters for the incident map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapQuery {
    /// Record filters.
    pub filters: RecordFilters,
    /// Per-record metric used for marker size and colour.
    pub metric: Metric,
}

/// One map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Area the crimes were recorded in.
    pub lsoa_code: LsoaCode,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Crime count.
    pub crime_count: u64,
    /// Per-row rate, when the query asked for one.
    pub rate: Option<f64>,
}

impl MapPoint {
    /// The value the marker should be sized by.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self) -> f64 {
        self.rate.unwrap_or(self.crime_count as f64)
    }
}

/// Geographic centre used to frame the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCenter {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// Result of a map query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResult {
    /// Markers, one per remaining record.
    pub points: Vec<MapPoint>,
    /// Largest marker value, for scaling marker sizes.
    pub max_value: Option<f64>,
    /// Mean location of the whole dataset.
    pub center: Option<MapCenter>,
    /// Rows excluded by the population join.
    pub join: JoinReport,
}

/// Parameters for the crime-vs-deprivation scatter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeprivationQuery {
    /// Crime type, or `"Total Crime"` for all.
    pub crime_type: Selection<CrimeType>,
    /// Year, or `"All years"` for one point per area per year.
    pub year: Selection<i32>,
    /// District, or `"All Districts"`.
    pub district: Selection<District>,
}

/// One area in the crime-vs-deprivation scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprivationPoint {
    /// Area code.
    pub lsoa_code: LsoaCode,
    /// District containing the area.
    pub district: District,
    /// Calendar year.
    pub year: i32,
    /// Crimes in the area that year.
    pub crime_count: u64,
    /// Area population.
    pub population: u32,
    /// IMD score of the area.
    pub imd_score: f64,
}

/// Result of a deprivation scatter query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprivationResult {
    /// Points ordered by area code, then year.
    pub points: Vec<DeprivationPoint>,
    /// Areas dropped because the population or score join missed.
    pub join: JoinReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_window_divisors() {
        let window = CoverageWindow::default();
        assert_eq!(window.months_for(&Selection::All), 36);
        assert_eq!(window.months_for(&Selection::Only(2019)), 3);
        assert_eq!(window.months_for(&Selection::Only(2020)), 12);
        assert_eq!(window.months_for(&Selection::Only(2021)), 12);
        assert_eq!(window.months_for(&Selection::Only(2022)), 9);
    }

    #[test]
    fn coverage_window_from_toml() {
        let window: CoverageWindow = toml::from_str(
            r"
            all_years_months = 24
            partial_years = [{ year = 2023, months = 6 }]
            ",
        )
        .unwrap();
        assert_eq!(window.months_for(&Selection::All), 24);
        assert_eq!(window.months_for(&Selection::Only(2023)), 6);
        assert_eq!(window.months_for(&Selection::Only(2019)), 12);
    }

    #[test]
    fn coverage_window_rejects_zero_months() {
        assert!(CoverageWindow::default().validate().is_ok());

        let window = CoverageWindow {
            full_year_months: 0,
            ..CoverageWindow::default()
        };
        assert_eq!(window.validate().unwrap_err().selection, "full year");

        let window = CoverageWindow {
            partial_years: vec![YearCoverage {
                year: 2022,
                months: 0,
            }],
            ..CoverageWindow::default()
        };
        assert_eq!(window.validate().unwrap_err().selection, "2022");
    }

    #[test]
    fn metric_and_group_keywords() {
        assert_eq!("rate".parse::<Metric>().unwrap(), Metric::RatePer1000);
        assert_eq!(
            "monthly_rate".parse::<Metric>().unwrap(),
            Metric::MonthlyRate
        );
        assert_eq!("crime_type".parse::<GroupBy>().unwrap(), GroupBy::CrimeType);
        assert_eq!(GroupBy::Period.to_string(), "period");
        assert!("hourly".parse::<GroupBy>().is_err());
        assert!(!Metric::Count.requires_population());
    }

    #[test]
    fn breakdown_relaxes_grouped_dimension_only() {
        let query = AggregateQuery {
            filters: RecordFilters {
                crime_type: Selection::Only(CrimeType::Drugs),
                year: Selection::Only(2021),
                district: Selection::Only(District::Pendle),
                decile: Selection::All,
            },
            group_by: GroupBy::District,
            metric: Metric::Count,
        };
        let relaxed = query.breakdown();
        assert_eq!(relaxed.filters.district, Selection::All);
        assert_eq!(relaxed.filters.crime_type, Selection::Only(CrimeType::Drugs));
        assert_eq!(relaxed.filters.year, Selection::Only(2021));

        let by_decile = AggregateQuery {
            group_by: GroupBy::Decile,
            ..query
        };
        assert_eq!(by_decile.breakdown(), by_decile);
    }

    #[test]
    fn summary_row_serializes_camel_case() {
        let result = AggregateResult {
            rows: vec![SummaryRow {
                key: "Burglary".to_string(),
                value: 4.0,
            }],
            total: 4.0,
            months_divisor: None,
            join: JoinReport::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows"][0]["key"], "Burglary");
        assert_eq!(json["monthsDivisor"], serde_json::Value::Null);
        assert_eq!(json["join"]["unmatchedRows"], 0);
    }
}
