#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime dashboard server.
//!
//! Query-string parameters arrive as raw dropdown labels and are turned
//! into typed pipeline queries here. Pipeline results already serialize as
//! camelCase JSON and are returned as-is; only the envelope types the
//! pipeline has no counterpart for live in this crate.

use std::str::FromStr;

use crime_dashboard_analytics_models::{
    AggregateQuery, DeprivationQuery, GroupBy, MapQuery, Metric, RecordFilters, Selection,
    SelectionDomain, SeriesSplit, TimeSeriesQuery,
};
use crime_dashboard_crime_models::{CrimeType, DeprivationDecile, District};
use serde::{Deserialize, Serialize};

/// A query-string keyword outside its accepted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidParamError {
    /// Query parameter name.
    pub name: &'static str,
    /// Value that was supplied.
    pub value: String,
}

impl std::fmt::Display for InvalidParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid value for {}: {:?}", self.name, self.value)
    }
}

impl std::error::Error for InvalidParamError {}

/// Parses an optional keyword parameter, using `default` when absent.
fn keyword<T: FromStr>(
    name: &'static str,
    value: Option<&str>,
    default: T,
) -> Result<T, InvalidParamError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| InvalidParamError {
            name,
            value: v.to_string(),
        }),
    }
}

/// Dropdown filter parameters shared by the record-level endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Crime type label, or `Total Crime`.
    pub crime_type: Option<String>,
    /// Year, or `All years`.
    pub year: Option<String>,
    /// District name, or `All Districts`.
    pub district: Option<String>,
    /// Decile 1-10, or `All Deprivation Deciles`.
    pub decile: Option<String>,
}

impl FilterParams {
    /// Converts to record filters. Missing parameters select everything.
    #[must_use]
    pub fn to_filters(&self) -> RecordFilters {
        RecordFilters {
            crime_type: Selection::parse_opt(self.crime_type.as_deref()),
            year: Selection::parse_opt(self.year.as_deref()),
            district: Selection::parse_opt(self.district.as_deref()),
            decile: Selection::parse_opt(self.decile.as_deref()),
        }
    }
}

/// Query parameters for `/api/aggregate` and `/api/breakdown`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateParams {
    /// Dropdown filters.
    #[serde(flatten)]
    pub filters: FilterParams,
    /// `crime_type`, `district`, `decile` or `period`. Defaults to
    /// `crime_type`.
    pub group_by: Option<String>,
    /// `count`, `rate` or `monthly_rate`. Defaults to `count`.
    pub metric: Option<String>,
}

impl AggregateParams {
    /// Converts to a pipeline query.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParamError`] for an unknown `groupBy` or `metric`.
    pub fn to_query(&self) -> Result<AggregateQuery, InvalidParamError> {
        Ok(AggregateQuery {
            filters: self.filters.to_filters(),
            group_by: keyword("groupBy", self.group_by.as_deref(), GroupBy::CrimeType)?,
            metric: keyword("metric", self.metric.as_deref(), Metric::default())?,
        })
    }
}

/// Query parameters for `/api/timeseries`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesParams {
    /// Crime type label, or `Total Crime`.
    pub crime_type: Option<String>,
    /// District name, or `All Districts`.
    pub district: Option<String>,
    /// Decile 1-10, or `All Deprivation Deciles`.
    pub decile: Option<String>,
    /// `crime_type` or `district`; absent for a single line.
    pub split: Option<String>,
    /// `count`, `rate` or `monthly_rate`. Defaults to `count`.
    pub metric: Option<String>,
}

impl TimeSeriesParams {
    /// Converts to a pipeline query. The series always spans every year.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParamError`] for an unknown `split` or `metric`.
    pub fn to_query(&self) -> Result<TimeSeriesQuery, InvalidParamError> {
        let split = match self.split.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(v) => Some(v.parse::<SeriesSplit>().map_err(|_| InvalidParamError {
                name: "split",
                value: v.to_string(),
            })?),
        };
        Ok(TimeSeriesQuery {
            filters: RecordFilters {
                crime_type: Selection::parse_opt(self.crime_type.as_deref()),
                year: Selection::All,
                district: Selection::parse_opt(self.district.as_deref()),
                decile: Selection::parse_opt(self.decile.as_deref()),
            },
            split,
            metric: keyword("metric", self.metric.as_deref(), Metric::default())?,
        })
    }
}

/// Query parameters for `/api/map`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapParams {
    /// Dropdown filters.
    #[serde(flatten)]
    pub filters: FilterParams,
    /// `count`, `rate` or `monthly_rate`. Defaults to `count`.
    pub metric: Option<String>,
}

impl MapParams {
    /// Converts to a pipeline query.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParamError`] for an unknown `metric`.
    pub fn to_query(&self) -> Result<MapQuery, InvalidParamError> {
        Ok(MapQuery {
            filters: self.filters.to_filters(),
            metric: keyword("metric", self.metric.as_deref(), Metric::default())?,
        })
    }
}

/// Query parameters for `/api/deprivation`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprivationParams {
    /// Crime type label, or `Total Crime`.
    pub crime_type: Option<String>,
    /// Year, or `All years`.
    pub year: Option<String>,
    /// District name, or `All Districts`.
    pub district: Option<String>,
}

impl DeprivationParams {
    /// Converts to a pipeline query.
    #[must_use]
    pub fn to_query(&self) -> DeprivationQuery {
        DeprivationQuery {
            crime_type: Selection::parse_opt(self.crime_type.as_deref()),
            year: Selection::parse_opt(self.year.as_deref()),
            district: Selection::parse_opt(self.district.as_deref()),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of incident records loaded.
    pub records: usize,
}

/// The "select everything" label of each dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSentinels {
    /// Crime type sentinel.
    pub crime_type: String,
    /// Year sentinel.
    pub year: String,
    /// District sentinel.
    pub district: String,
    /// Decile sentinel.
    pub decile: String,
}

impl Default for ApiSentinels {
    fn default() -> Self {
        Self {
            crime_type: <CrimeType as SelectionDomain>::ALL_LABEL.to_string(),
            year: <i32 as SelectionDomain>::ALL_LABEL.to_string(),
            district: <District as SelectionDomain>::ALL_LABEL.to_string(),
            decile: <DeprivationDecile as SelectionDomain>::ALL_LABEL.to_string(),
        }
    }
}

/// Dropdown domains for the dashboard controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOptions {
    /// Crime type labels.
    pub crime_types: Vec<String>,
    /// District names.
    pub districts: Vec<String>,
    /// Years present in the data, ascending.
    pub years: Vec<i32>,
    /// Deciles 1-10.
    pub deciles: Vec<u8>,
    /// Sentinel labels.
    pub sentinels: ApiSentinels,
}

impl ApiOptions {
    /// Builds the option lists for the given data years.
    #[must_use]
    pub fn new(years: Vec<i32>) -> Self {
        Self {
            crime_types: CrimeType::all().iter().map(ToString::to_string).collect(),
            districts: District::all().iter().map(ToString::to_string).collect(),
            years,
            deciles: DeprivationDecile::all().into_iter().map(u8::from).collect(),
            sentinels: ApiSentinels::default(),
        }
    }
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps any displayable error.
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> AggregateParams {
        let value: serde_json::Value = serde_json::from_str(query).unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_params_use_defaults() {
        let query = AggregateParams::default().to_query().unwrap();
        assert_eq!(query.filters, RecordFilters::default());
        assert_eq!(query.group_by, GroupBy::CrimeType);
        assert_eq!(query.metric, Metric::Count);
    }

    #[test]
    fn camel_case_params_parse() {
        let query = params(
            r#"{"crimeType":"Burglary","year":"2020","district":"All Districts","groupBy":"district","metric":"monthly_rate"}"#,
        )
        .to_query()
        .unwrap();
        assert_eq!(query.filters.crime_type, Selection::Only(CrimeType::Burglary));
        assert_eq!(query.filters.year, Selection::Only(2020));
        assert_eq!(query.filters.district, Selection::All);
        assert_eq!(query.group_by, GroupBy::District);
        assert_eq!(query.metric, Metric::MonthlyRate);
    }

    #[test]
    fn unknown_keywords_are_rejected() {
        let err = params(r#"{"groupBy":"colour"}"#).to_query().unwrap_err();
        assert_eq!(err.name, "groupBy");
        assert_eq!(err.value, "colour");

        let err = TimeSeriesParams {
            split: Some("decile".to_string()),
            ..TimeSeriesParams::default()
        }
        .to_query()
        .unwrap_err();
        assert_eq!(err.name, "split");
    }

    #[test]
    fn unknown_filter_values_are_not_errors() {
        let query = params(r#"{"district":"Manchester"}"#).to_query().unwrap();
        assert_eq!(
            query.filters.district,
            Selection::Unknown("Manchester".to_string())
        );
    }

    #[test]
    fn time_series_spans_all_years() {
        let query = TimeSeriesParams {
            split: Some("crime_type".to_string()),
            ..TimeSeriesParams::default()
        }
        .to_query()
        .unwrap();
        assert_eq!(query.filters.year, Selection::All);
        assert_eq!(query.split, Some(SeriesSplit::CrimeType));
    }

    #[test]
    fn options_list_every_domain_value() {
        let options = ApiOptions::new(vec![2019, 2020]);
        assert_eq!(options.crime_types.len(), 14);
        assert_eq!(options.districts.len(), 14);
        assert_eq!(options.deciles, (1..=10).collect::<Vec<u8>>());
        assert_eq!(options.sentinels.year, "All years");

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["sentinels"]["crimeType"], "Total Crime");
        assert!(json["crimeTypes"].is_array());
    }
}
