#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Small-area geography types and reference tables.
//!
//! Crime records are keyed on LSOA codes. The population and deprivation
//! reference tables in this crate are joined against those codes to compute
//! per-capita rates and to plot crime against deprivation. Each table holds
//! exactly one entry per area code; constructing a table from entries with a
//! repeated code fails with [`DuplicateAreaError`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lower-layer Super Output Area code (e.g. `"E01012628"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LsoaCode(String);

impl LsoaCode {
    /// Creates an area code, trimming surrounding whitespace.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LsoaCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LsoaCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Index of Multiple Deprivation decile, from 1 (most deprived) to 10.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeprivationDecile(u8);

impl DeprivationDecile {
    /// Creates a decile from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-10.
    pub const fn from_value(value: u8) -> Result<Self, InvalidDecileError> {
        if value >= 1 && value <= 10 {
            Ok(Self(value))
        } else {
            Err(InvalidDecileError { value })
        }
    }

    /// Returns the numeric value of this decile.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns all ten deciles in ascending order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        (1..=10).map(Self).collect()
    }
}

impl std::fmt::Display for DeprivationDecile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for DeprivationDecile {
    type Error = InvalidDecileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<DeprivationDecile> for u8 {
    fn from(decile: DeprivationDecile) -> Self {
        decile.0
    }
}

/// Error returned when a [`DeprivationDecile`] is built from a value
/// outside 1-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDecileError {
    /// The invalid decile value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidDecileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid deprivation decile {}: expected 1-10", self.value)
    }
}

impl std::error::Error for InvalidDecileError {}

/// Error returned when a reference table receives two entries for the same
/// area code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateAreaError {
    /// The repeated area code.
    pub lsoa_code: LsoaCode,
}

impl std::fmt::Display for DuplicateAreaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate reference entry for area {}", self.lsoa_code)
    }
}

impl std::error::Error for DuplicateAreaError {}

/// Error returned when a population value is not a whole number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPopulationError {
    /// Area whose population failed to parse.
    pub lsoa_code: LsoaCode,
    /// The raw value as read from the source file.
    pub value: String,
}

impl std::fmt::Display for InvalidPopulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "population for area {} is not an integer: {:?}",
            self.lsoa_code, self.value
        )
    }
}

impl std::error::Error for InvalidPopulationError {}

/// Parses a population figure, accepting thousands separators
/// (`"1,532"` -> `1532`).
///
/// Returns `None` if the value is not a non-negative whole number.
#[must_use]
pub fn parse_population(raw: &str) -> Option<u32> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Population by area.
///
/// Values are kept exactly as read and only coerced to integers when a rate
/// is requested, so a malformed value fails the query that needs it rather
/// than the whole load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationTable {
    entries: BTreeMap<LsoaCode, String>,
}

impl PopulationTable {
    /// Builds a table from `(area, raw population)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateAreaError`] if an area code appears twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (LsoaCode, String)>,
    ) -> Result<Self, DuplicateAreaError> {
        let mut map = BTreeMap::new();
        for (code, raw) in entries {
            if map.contains_key(&code) {
                return Err(DuplicateAreaError { lsoa_code: code });
            }
            map.insert(code, raw);
        }
        Ok(Self { entries: map })
    }

    /// Looks up and coerces the population for `code`.
    ///
    /// Returns `None` when the area has no entry.
    ///
    /// # Errors
    ///
    /// The inner result is an [`InvalidPopulationError`] when the stored
    /// value is not a whole number.
    #[must_use]
    pub fn population(&self, code: &LsoaCode) -> Option<Result<u32, InvalidPopulationError>> {
        self.entries.get(code).map(|raw| {
            parse_population(raw).ok_or_else(|| InvalidPopulationError {
                lsoa_code: code.clone(),
                value: raw.clone(),
            })
        })
    }

    /// Number of areas in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// IMD score (and optional decile) for one area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprivationScore {
    /// Index of Multiple Deprivation score (higher is more deprived).
    pub score: f64,
    /// IMD decile, when the source file carries one.
    pub decile: Option<DeprivationDecile>,
}

/// Deprivation scores by area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeprivationTable {
    entries: BTreeMap<LsoaCode, DeprivationScore>,
}

impl DeprivationTable {
    /// Builds a table from `(area, score)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateAreaError`] if an area code appears twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (LsoaCode, DeprivationScore)>,
    ) -> Result<Self, DuplicateAreaError> {
        let mut map = BTreeMap::new();
        for (code, score) in entries {
            if map.contains_key(&code) {
                return Err(DuplicateAreaError { lsoa_code: code });
            }
            map.insert(code, score);
        }
        Ok(Self { entries: map })
    }

    /// Returns the score for `code`, if present.
    #[must_use]
    pub fn get(&self, code: &LsoaCode) -> Option<&DeprivationScore> {
        self.entries.get(code)
    }

    /// Number of areas in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decile_range_valid() {
        for v in 1..=10u8 {
            assert_eq!(DeprivationDecile::from_value(v).unwrap().value(), v);
        }
        assert!(DeprivationDecile::from_value(0).is_err());
        assert!(DeprivationDecile::from_value(11).is_err());
        assert_eq!(DeprivationDecile::all().len(), 10);
    }

    #[test]
    fn population_accepts_thousands_separators() {
        assert_eq!(parse_population("1,532"), Some(1532));
        assert_eq!(parse_population(" 2101 "), Some(2101));
        assert_eq!(parse_population("0"), Some(0));
    }

    #[test]
    fn population_rejects_non_integers() {
        assert_eq!(parse_population("1532.5"), None);
        assert_eq!(parse_population("n/a"), None);
        assert_eq!(parse_population(""), None);
        assert_eq!(parse_population("-4"), None);
    }

    #[test]
    fn population_rejects_signs_and_underscores() {
        assert_eq!(parse_population("+750"), None);
        assert_eq!(parse_population("1_000"), None);

        let table = PopulationTable::from_entries([
            (LsoaCode::new("S"), "+750".to_string()),
            (LsoaCode::new("U"), "1_000".to_string()),
        ])
        .unwrap();
        assert!(table.population(&LsoaCode::new("S")).unwrap().is_err());
        assert!(table.population(&LsoaCode::new("U")).unwrap().is_err());
    }

    #[test]
    fn population_table_coerces_on_lookup() {
        let table = PopulationTable::from_entries([
            (LsoaCode::new("E01000001"), "1,500".to_string()),
            (LsoaCode::new("E01000002"), "lots".to_string()),
        ])
        .unwrap();

        assert_eq!(
            table.population(&LsoaCode::new("E01000001")),
            Some(Ok(1500))
        );
        let err = table
            .population(&LsoaCode::new("E01000002"))
            .unwrap()
            .unwrap_err();
        assert_eq!(err.value, "lots");
        assert!(table.population(&LsoaCode::new("E01999999")).is_none());
    }

    #[test]
    fn duplicate_area_rejected() {
        let err = PopulationTable::from_entries([
            (LsoaCode::new("E01000001"), "10".to_string()),
            (LsoaCode::new("E01000001 "), "20".to_string()),
        ])
        .unwrap_err();
        assert_eq!(err.lsoa_code.as_str(), "E01000001");

        let score = DeprivationScore {
            score: 12.5,
            decile: None,
        };
        assert!(
            DeprivationTable::from_entries([
                (LsoaCode::new("E01000003"), score),
                (LsoaCode::new("E01000003"), score),
            ])
            .is_err()
        );
    }
}
