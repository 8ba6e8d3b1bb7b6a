//! Join coverage report for the `validate` subcommand.

use std::collections::BTreeSet;

use crime_dashboard_analytics::Dataset;
use crime_dashboard_geography_models::{InvalidPopulationError, LsoaCode};

/// How well the incident areas line up with the reference tables.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub records: usize,
    pub years: Vec<i32>,
    pub areas: usize,
    pub population_areas: usize,
    pub deprivation_areas: usize,
    pub missing_population: Vec<LsoaCode>,
    pub zero_population: Vec<LsoaCode>,
    pub invalid_population: Vec<InvalidPopulationError>,
    pub missing_scores: Vec<LsoaCode>,
}

impl ValidationReport {
    /// Whether every incident area has a usable population and a score.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_population.is_empty()
            && self.zero_population.is_empty()
            && self.invalid_population.is_empty()
            && self.missing_scores.is_empty()
    }
}

/// Checks every distinct incident area against both reference tables.
#[must_use]
pub fn validate(dataset: &Dataset) -> ValidationReport {
    let areas: BTreeSet<&LsoaCode> = dataset.records().iter().map(|r| &r.lsoa_code).collect();

    let mut report = ValidationReport {
        records: dataset.records().len(),
        years: dataset.years(),
        areas: areas.len(),
        population_areas: dataset.population().len(),
        deprivation_areas: dataset.deprivation().len(),
        ..ValidationReport::default()
    };

    for code in areas {
        match dataset.population().population(code) {
            None => report.missing_population.push(code.clone()),
            Some(Ok(0)) => report.zero_population.push(code.clone()),
            Some(Ok(_)) => {}
            Some(Err(e)) => report.invalid_population.push(e),
        }
        if dataset.deprivation().get(code).is_none() {
            report.missing_scores.push(code.clone());
        }
    }

    report
}

fn print_areas(label: &str, codes: &[LsoaCode]) {
    if codes.is_empty() {
        return;
    }
    let shown: Vec<&str> = codes.iter().take(10).map(LsoaCode::as_str).collect();
    let more = codes.len().saturating_sub(shown.len());
    if more > 0 {
        println!("  {label}: {} (and {more} more)", shown.join(", "));
    } else {
        println!("  {label}: {}", shown.join(", "));
    }
}

/// Prints the report in a human-readable form.
pub fn print(report: &ValidationReport) {
    println!("Incident records:   {}", report.records);
    println!(
        "Years:              {}",
        report
            .years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Distinct areas:     {}", report.areas);
    println!("Population entries: {}", report.population_areas);
    println!("IMD score entries:  {}", report.deprivation_areas);

    if report.is_clean() {
        println!("All areas join cleanly.");
        return;
    }

    println!("Join problems:");
    print_areas("no population entry", &report.missing_population);
    print_areas("zero population", &report.zero_population);
    for e in &report.invalid_population {
        println!("  {e}");
    }
    print_areas("no IMD score", &report.missing_scores);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_dashboard_analytics_models::CoverageWindow;
    use crime_dashboard_crime_models::{
        CrimeType, DeprivationDecile, District, IncidentRecord, Period,
    };
    use crime_dashboard_geography_models::{DeprivationScore, DeprivationTable, PopulationTable};

    fn record(lsoa: &str) -> IncidentRecord {
        IncidentRecord {
            lsoa_code: LsoaCode::new(lsoa),
            crime_type: CrimeType::Robbery,
            period: Period::new(2021, 5).unwrap(),
            district: District::Burnley,
            decile: DeprivationDecile::from_value(3).unwrap(),
            latitude: 53.79,
            longitude: -2.24,
            crime_count: 1,
        }
    }

    #[test]
    fn reports_each_kind_of_join_gap() {
        let dataset = Dataset::new(
            vec![record("A"), record("A"), record("B"), record("C"), record("D")],
            PopulationTable::from_entries([
                (LsoaCode::new("A"), "1,200".to_string()),
                (LsoaCode::new("B"), "0".to_string()),
                (LsoaCode::new("C"), "lots".to_string()),
            ])
            .unwrap(),
            DeprivationTable::from_entries([(
                LsoaCode::new("A"),
                DeprivationScore {
                    score: 12.0,
                    decile: None,
                },
            )])
            .unwrap(),
            CoverageWindow::default(),
        );

        let report = validate(&dataset);
        assert_eq!(report.records, 5);
        assert_eq!(report.areas, 4);
        assert_eq!(report.years, vec![2021]);
        assert_eq!(report.missing_population, vec![LsoaCode::new("D")]);
        assert_eq!(report.zero_population, vec![LsoaCode::new("B")]);
        assert_eq!(report.invalid_population.len(), 1);
        assert_eq!(report.missing_scores.len(), 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_dataset_is_clean() {
        assert!(validate(&Dataset::default()).is_clean());
    }
}
