//! Population and IMD score readers.

use std::io::Read;

use crime_dashboard_crime_models::{DeprivationDecile, LsoaCode};
use crime_dashboard_geography_models::{DeprivationScore, DeprivationTable, PopulationTable};
use serde::Deserialize;

use crate::IngestError;

#[derive(Debug, Deserialize)]
struct RawPopulation {
    #[serde(rename = "LSOA Code", alias = "LSOA code")]
    lsoa_code: String,
    #[serde(rename = "Population")]
    population: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(rename = "LSOA code (2011)", alias = "LSOA code")]
    lsoa_code: String,
    #[serde(rename = "Index of Multiple Deprivation (IMD) Score")]
    score: f64,
    #[serde(
        default,
        rename = "Index of Multiple Deprivation (IMD) Decile",
        alias = "Index of Multiple Deprivation (IMD) Decile (where 1 is most deprived 10% of LSOAs)"
    )]
    decile: Option<u8>,
}

/// Reads the population table.
///
/// Population values are stored as written (e.g. `"1,532"`) and coerced
/// when a rate is computed.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] for malformed CSV and
/// [`IngestError::DuplicateArea`] if an area code repeats.
pub fn read_population<R: Read>(reader: R, file: &str) -> Result<PopulationTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut entries = Vec::new();

    for row in reader.deserialize() {
        let raw: RawPopulation = row?;
        entries.push((LsoaCode::new(&raw.lsoa_code), raw.population));
    }

    let table = PopulationTable::from_entries(entries).map_err(|source| {
        IngestError::DuplicateArea {
            file: file.to_string(),
            source,
        }
    })?;
    log::info!("{file}: loaded population for {} areas", table.len());
    Ok(table)
}

/// Reads the IMD score table.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] for malformed CSV, [`IngestError::Field`]
/// for a decile outside 1-10, and [`IngestError::DuplicateArea`] if an area
/// code repeats.
pub fn read_deprivation<R: Read>(reader: R, file: &str) -> Result<DeprivationTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut entries = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, csv::Position::line);
        let raw: RawScore = row.deserialize(Some(&headers))?;
        let decile = raw
            .decile
            .map(DeprivationDecile::from_value)
            .transpose()
            .map_err(|e| IngestError::Field {
                file: file.to_string(),
                line,
                message: e.to_string(),
            })?;
        entries.push((
            LsoaCode::new(&raw.lsoa_code),
            DeprivationScore {
                score: raw.score,
                decile,
            },
        ));
    }

    let table = DeprivationTable::from_entries(entries).map_err(|source| {
        IngestError::DuplicateArea {
            file: file.to_string(),
            source,
        }
    })?;
    log::info!("{file}: loaded IMD scores for {} areas", table.len());
    Ok(table)
}
