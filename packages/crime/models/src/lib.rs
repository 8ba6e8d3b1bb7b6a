#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime type, district, and incident record types.
//!
//! This crate defines the categorical domains the dashboard filters on:
//! the police.uk crime types, the Lancashire local authority districts, and
//! the monthly [`Period`] each record falls in. Display labels match the
//! strings used in the source CSV files exactly, so parsing a label and
//! printing it again yields the same text.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use crime_dashboard_geography_models::{DeprivationDecile, LsoaCode};

/// A police.uk crime type.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CrimeType {
    #[serde(rename = "Anti-social behaviour")]
    #[strum(serialize = "Anti-social behaviour")]
    AntiSocialBehaviour,
    #[serde(rename = "Bicycle theft")]
    #[strum(serialize = "Bicycle theft")]
    BicycleTheft,
    #[serde(rename = "Burglary")]
    #[strum(serialize = "Burglary")]
    Burglary,
    #[serde(rename = "Criminal damage and arson")]
    #[strum(serialize = "Criminal damage and arson")]
    CriminalDamageAndArson,
    #[serde(rename = "Drugs")]
    #[strum(serialize = "Drugs")]
    Drugs,
    #[serde(rename = "Other crime")]
    #[strum(serialize = "Other crime")]
    OtherCrime,
    #[serde(rename = "Other theft")]
    #[strum(serialize = "Other theft")]
    OtherTheft,
    #[serde(rename = "Possession of weapons")]
    #[strum(serialize = "Possession of weapons")]
    PossessionOfWeapons,
    #[serde(rename = "Public order")]
    #[strum(serialize = "Public order")]
    PublicOrder,
    #[serde(rename = "Robbery")]
    #[strum(serialize = "Robbery")]
    Robbery,
    #[serde(rename = "Shoplifting")]
    #[strum(serialize = "Shoplifting")]
    Shoplifting,
    #[serde(rename = "Theft from the person")]
    #[strum(serialize = "Theft from the person")]
    TheftFromThePerson,
    #[serde(rename = "Vehicle crime")]
    #[strum(serialize = "Vehicle crime")]
    VehicleCrime,
    #[serde(rename = "Violence and sexual offences")]
    #[strum(serialize = "Violence and sexual offences")]
    ViolenceAndSexualOffences,
}

impl CrimeType {
    /// Label used in source files and dropdowns for "every crime type".
    pub const TOTAL_LABEL: &'static str = "Total Crime";

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AntiSocialBehaviour,
            Self::BicycleTheft,
            Self::Burglary,
            Self::CriminalDamageAndArson,
            Self::Drugs,
            Self::OtherCrime,
            Self::OtherTheft,
            Self::PossessionOfWeapons,
            Self::PublicOrder,
            Self::Robbery,
            Self::Shoplifting,
            Self::TheftFromThePerson,
            Self::VehicleCrime,
            Self::ViolenceAndSexualOffences,
        ]
    }
}

/// A Lancashire local authority district.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum District {
    #[serde(rename = "Blackburn with Darwen")]
    #[strum(serialize = "Blackburn with Darwen")]
    BlackburnWithDarwen,
    #[serde(rename = "Blackpool")]
    #[strum(serialize = "Blackpool")]
    Blackpool,
    #[serde(rename = "Burnley")]
    #[strum(serialize = "Burnley")]
    Burnley,
    #[serde(rename = "Chorley")]
    #[strum(serialize = "Chorley")]
    Chorley,
    #[serde(rename = "Fylde")]
    #[strum(serialize = "Fylde")]
    Fylde,
    #[serde(rename = "Hyndburn")]
    #[strum(serialize = "Hyndburn")]
    Hyndburn,
    #[serde(rename = "Lancaster")]
    #[strum(serialize = "Lancaster")]
    Lancaster,
    #[serde(rename = "Pendle")]
    #[strum(serialize = "Pendle")]
    Pendle,
    #[serde(rename = "Preston")]
    #[strum(serialize = "Preston")]
    Preston,
    #[serde(rename = "Ribble Valley")]
    #[strum(serialize = "Ribble Valley")]
    RibbleValley,
    #[serde(rename = "Rossendale")]
    #[strum(serialize = "Rossendale")]
    Rossendale,
    #[serde(rename = "South Ribble")]
    #[strum(serialize = "South Ribble")]
    SouthRibble,
    #[serde(rename = "West Lancashire")]
    #[strum(serialize = "West Lancashire")]
    WestLancashire,
    #[serde(rename = "Wyre")]
    #[strum(serialize = "Wyre")]
    Wyre,
}

impl District {
    /// Label used in dropdowns for "every district".
    pub const ALL_LABEL: &'static str = "All Districts";

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::BlackburnWithDarwen,
            Self::Blackpool,
            Self::Burnley,
            Self::Chorley,
            Self::Fylde,
            Self::Hyndburn,
            Self::Lancaster,
            Self::Pendle,
            Self::Preston,
            Self::RibbleValley,
            Self::Rossendale,
            Self::SouthRibble,
            Self::WestLancashire,
            Self::Wyre,
        ]
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Month of the year (1-12).
    pub month: u32,
}

impl Period {
    /// Creates a period after checking that `(year, month)` is a real month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month is outside 1-12 or the year is outside
    /// the range `chrono` can represent.
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidPeriodError> {
        let date =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(InvalidPeriodError { year, month })?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }

    /// Sortable `YYYY-MM` label.
    #[must_use]
    pub fn label(self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).map_or_else(
            || format!("{:04}-{:02}", self.year, self.month),
            |d| d.format("%Y-%m").to_string(),
        )
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Error returned when a [`Period`] does not name a real calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPeriodError {
    /// The year that was provided.
    pub year: i32,
    /// The month that was provided.
    pub month: u32,
}

impl std::fmt::Display for InvalidPeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid period {}-{}: expected a month in 1-12",
            self.year, self.month
        )
    }
}

impl std::error::Error for InvalidPeriodError {}

/// One row of the incident dataset: the number of crimes of one type in one
/// LSOA during one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Small-area code the crimes were recorded in.
    pub lsoa_code: LsoaCode,
    /// Crime type.
    pub crime_type: CrimeType,
    /// Month the crimes were recorded in.
    pub period: Period,
    /// Local authority district containing the LSOA.
    pub district: District,
    /// IMD decile of the LSOA.
    pub decile: DeprivationDecile,
    /// Latitude of the LSOA centroid.
    pub latitude: f64,
    /// Longitude of the LSOA centroid.
    pub longitude: f64,
    /// Number of crimes.
    pub crime_count: u64,
}

impl IncidentRecord {
    /// Calendar year of the record.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.period.year
    }
}
