//! Incident CSV reader.
//!
//! Columns are matched by header name and extra columns are ignored.
//! Rollup rows (`Total Crime`, `All years`) that the extract carries
//! alongside the base rows are skipped, since every rollup is recomputed
//! from the base rows at query time.

use std::io::Read;

use crime_dashboard_analytics_models::SelectionDomain;
use crime_dashboard_crime_models::{
    CrimeType, DeprivationDecile, District, IncidentRecord, LsoaCode, Period,
};
use serde::Deserialize;

use crate::IngestError;
use crate::progress::ProgressCallback;

/// Rows between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

#[derive(Debug, Deserialize)]
struct RawIncident {
    #[serde(rename = "LSOA code")]
    lsoa_code: String,
    #[serde(rename = "Crime type")]
    crime_type: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Crime count")]
    crime_count: String,
    #[serde(rename = "Local Authority District name")]
    district: String,
    #[serde(rename = "Index of Multiple Deprivation Decile")]
    decile: String,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

/// Counters from reading the incident file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncidentStats {
    /// Data rows in the file.
    pub rows_read: u64,
    /// Rollup rows skipped.
    pub rollups_skipped: u64,
}

/// Parses a whole number, accepting a trailing `.0` as written by
/// dataframe exports.
fn parse_whole(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        (value >= 0.0 && value.fract() == 0.0 && value < 9.0e15).then_some(value as u64)
    })
}

fn is_rollup(raw: &RawIncident) -> bool {
    raw.crime_type.trim().eq_ignore_ascii_case(CrimeType::TOTAL_LABEL)
        || raw.year.trim().eq_ignore_ascii_case(<i32 as SelectionDomain>::ALL_LABEL)
}

fn convert(raw: RawIncident) -> Result<IncidentRecord, String> {
    let crime_type: CrimeType = raw
        .crime_type
        .trim()
        .parse()
        .map_err(|_| format!("unknown crime type {:?}", raw.crime_type))?;
    let district: District = raw
        .district
        .trim()
        .parse()
        .map_err(|_| format!("unknown district {:?}", raw.district))?;
    let year: i32 = raw
        .year
        .trim()
        .parse()
        .map_err(|_| format!("invalid year {:?}", raw.year))?;
    let month = parse_whole(&raw.month)
        .and_then(|m| u32::try_from(m).ok())
        .ok_or_else(|| format!("invalid month {:?}", raw.month))?;
    let period = Period::new(year, month).map_err(|e| e.to_string())?;
    let decile = parse_whole(&raw.decile)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| format!("invalid deprivation decile {:?}", raw.decile))
        .and_then(|d| DeprivationDecile::from_value(d).map_err(|e| e.to_string()))?;
    let crime_count = parse_whole(&raw.crime_count)
        .ok_or_else(|| format!("invalid crime count {:?}", raw.crime_count))?;

    Ok(IncidentRecord {
        lsoa_code: LsoaCode::new(&raw.lsoa_code),
        crime_type,
        period,
        district,
        decile,
        latitude: raw.latitude,
        longitude: raw.longitude,
        crime_count,
    })
}

/// Reads incident records from CSV.
///
/// `file` names the source in error messages.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] for malformed CSV or missing columns, and
/// [`IngestError::Field`] with the line number for a value outside its
/// domain.
pub fn read_incidents<R: Read>(
    reader: R,
    file: &str,
    progress: &dyn ProgressCallback,
) -> Result<(Vec<IncidentRecord>, IncidentStats), IngestError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    let mut stats = IncidentStats::default();

    progress.set_message(format!("Reading {file}"));

    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, csv::Position::line);
        let raw: RawIncident = row.deserialize(Some(&headers))?;
        stats.rows_read += 1;

        if is_rollup(&raw) {
            stats.rollups_skipped += 1;
        } else {
            let record = convert(raw).map_err(|message| IngestError::Field {
                file: file.to_string(),
                line,
                message,
            })?;
            records.push(record);
        }

        if stats.rows_read % PROGRESS_BATCH == 0 {
            progress.inc(PROGRESS_BATCH);
        }
    }

    progress.inc(stats.rows_read % PROGRESS_BATCH);
    progress.finish(format!("{file}: {} records", records.len()));

    if stats.rollups_skipped > 0 {
        log::debug!("{file}: skipped {} rollup rows", stats.rollups_skipped);
    }
    log::info!("{file}: loaded {} incident records", records.len());

    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    const HEADER: &str = "LSOA code,Crime type,Year,Month,Crime count,Local Authority District name,Index of Multiple Deprivation Decile,Latitude,Longitude,LSOA name";

    fn read(body: &str) -> Result<(Vec<IncidentRecord>, IncidentStats), IngestError> {
        let csv = format!("{HEADER}\n{body}");
        read_incidents(csv.as_bytes(), "incidents.csv", &NullProgress)
    }

    #[test]
    fn reads_base_rows() {
        let (records, stats) = read(
            "E01025300,Burglary,2020,3,2,Preston,1,53.76,-2.70,Preston 001A\n\
             E01025301,Vehicle crime,2021,11,0.0,Wyre,8.0,53.90,-2.98,Wyre 002B\n",
        )
        .unwrap();

        assert_eq!(stats.rows_read, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].crime_type, CrimeType::Burglary);
        assert_eq!(records[0].period, Period::new(2020, 3).unwrap());
        assert_eq!(records[0].crime_count, 2);
        assert_eq!(records[1].district, District::Wyre);
        assert_eq!(records[1].decile.value(), 8);
        assert_eq!(records[1].crime_count, 0);
    }

    #[test]
    fn skips_rollup_rows() {
        let (records, stats) = read(
            "E01025300,Total Crime,2020,3,9,Preston,1,53.76,-2.70,x\n\
             E01025300,Burglary,All years,3,40,Preston,1,53.76,-2.70,x\n\
             E01025300,Drugs,2020,3,1,Preston,1,53.76,-2.70,x\n",
        )
        .unwrap();
        assert_eq!(stats.rollups_skipped, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].crime_type, CrimeType::Drugs);
    }

    #[test]
    fn out_of_domain_value_names_line() {
        let err = read(
            "E01025300,Burglary,2020,3,2,Preston,1,53.76,-2.70,x\n\
             E01025300,Burglary,2020,3,2,Preston,12,53.76,-2.70,x\n",
        )
        .unwrap_err();
        match err {
            IngestError::Field { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("12"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_negative_counts_and_bad_months() {
        assert!(read("E1,Burglary,2020,3,-1,Preston,1,53.7,-2.7,x\n").is_err());
        assert!(read("E1,Burglary,2020,13,1,Preston,1,53.7,-2.7,x\n").is_err());
        assert!(read("E1,Burglary,2020,3,1,Manchester,1,53.7,-2.7,x\n").is_err());
    }

    #[test]
    fn missing_column_is_a_csv_error() {
        let csv = "LSOA code,Crime type\nE1,Burglary\n";
        let err = read_incidents(csv.as_bytes(), "incidents.csv", &NullProgress).unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }

    #[test]
    fn whole_numbers_accept_trailing_zero_fraction() {
        assert_eq!(parse_whole("7"), Some(7));
        assert_eq!(parse_whole("7.0"), Some(7));
        assert_eq!(parse_whole("7.5"), None);
        assert_eq!(parse_whole("-1"), None);
    }
}
