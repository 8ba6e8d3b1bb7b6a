//! Dropdown filter values.
//!
//! Every filter the dashboard offers is either a sentinel meaning "don't
//! filter on this" (`"All years"`, `"All Districts"`, ...) or a single value
//! from the dimension's domain. Values outside the domain are kept as
//! [`Selection::Unknown`] and match nothing, so a bad dropdown value yields
//! an empty view rather than an error.

use crime_dashboard_crime_models::{CrimeType, DeprivationDecile, District};

/// A categorical domain that can be selected from a dropdown.
pub trait SelectionDomain: Sized {
    /// Label of the "no filter" sentinel for this domain.
    const ALL_LABEL: &'static str;

    /// Parses a single domain value from its dropdown label.
    fn parse_label(label: &str) -> Option<Self>;
}

impl SelectionDomain for CrimeType {
    const ALL_LABEL: &'static str = Self::TOTAL_LABEL;

    fn parse_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

impl SelectionDomain for District {
    const ALL_LABEL: &'static str = Self::ALL_LABEL;

    fn parse_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

impl SelectionDomain for DeprivationDecile {
    const ALL_LABEL: &'static str = "All Deprivation Deciles";

    fn parse_label(label: &str) -> Option<Self> {
        label
            .parse::<u8>()
            .ok()
            .and_then(|v| Self::from_value(v).ok())
    }
}

/// Years are open-ended: any integer is a valid selection, and years with
/// no data simply match nothing.
impl SelectionDomain for i32 {
    const ALL_LABEL: &'static str = "All years";

    fn parse_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }
}

/// The state of one dropdown filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    /// The "all" sentinel; the predicate is skipped.
    #[default]
    All,
    /// Only records with this value pass.
    Only(T),
    /// A label outside the domain; no record passes.
    Unknown(String),
}

impl<T: SelectionDomain> Selection<T> {
    /// Parses a dropdown label. The sentinel label (and an empty string)
    /// select everything.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(T::ALL_LABEL) {
            return Self::All;
        }
        T::parse_label(label).map_or_else(
            || {
                log::debug!("Unrecognized filter value {label:?}; it will match nothing");
                Self::Unknown(label.to_string())
            },
            Self::Only,
        )
    }

    /// Parses an optional query-string value, treating a missing value as
    /// the sentinel.
    #[must_use]
    pub fn parse_opt(label: Option<&str>) -> Self {
        label.map_or(Self::All, Self::parse)
    }
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` passes this filter.
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == value,
            Self::Unknown(_) => false,
        }
    }

    /// Whether this is the "all" sentinel.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T: SelectionDomain + std::fmt::Display> std::fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(T::ALL_LABEL),
            Self::Only(value) => write!(f, "{value}"),
            Self::Unknown(label) => f.write_str(label),
        }
    }
}
