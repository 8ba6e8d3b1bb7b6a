//! Per-record metric evaluation and the population join.

use std::collections::BTreeSet;

use crime_dashboard_analytics_models::{JoinReport, Metric};
use crime_dashboard_crime_models::{IncidentRecord, LsoaCode};
use crime_dashboard_geography_models::PopulationTable;

use crate::{AnalyticsError, round2};

/// Crimes per 1,000 residents over `months`, rounded to two places.
///
/// Returns `None` when the population is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_per_1000(crime_count: u64, population: u32, months: u32) -> Option<f64> {
    if population == 0 || months == 0 {
        return None;
    }
    Some(round2(
        crime_count as f64 / f64::from(population) * 1000.0 / f64::from(months),
    ))
}

/// Tallies rows a reference-table join had to drop.
#[derive(Debug, Default)]
pub struct JoinTally {
    unmatched_rows: u64,
    zero_population_rows: u64,
    unmatched_areas: BTreeSet<LsoaCode>,
}

impl JoinTally {
    pub fn unmatched(&mut self, code: &LsoaCode) {
        self.unmatched_rows += 1;
        self.unmatched_areas.insert(code.clone());
    }

    pub const fn zero_population(&mut self) {
        self.zero_population_rows += 1;
    }

    /// Finishes the tally, warning once if anything was excluded.
    pub fn finish(self, context: &str) -> JoinReport {
        let report = JoinReport {
            unmatched_rows: self.unmatched_rows,
            zero_population_rows: self.zero_population_rows,
            unmatched_areas: self.unmatched_areas.into_iter().collect(),
        };
        if report.has_exclusions() {
            log::warn!(
                "{context}: excluded {} rows with no reference entry ({} areas) and {} rows with zero population",
                report.unmatched_rows,
                report.unmatched_areas.len(),
                report.zero_population_rows,
            );
        }
        report
    }
}

/// Computes one metric for a sequence of records, sharing a single join
/// tally.
pub struct MetricEvaluator<'a> {
    population: &'a PopulationTable,
    metric: Metric,
    months: u32,
    tally: JoinTally,
}

impl<'a> MetricEvaluator<'a> {
    /// `months` is the divisor for [`Metric::MonthlyRate`]; it is ignored
    /// by the other metrics.
    pub fn new(population: &'a PopulationTable, metric: Metric, months: u32) -> Self {
        Self {
            population,
            metric,
            months,
            tally: JoinTally::default(),
        }
    }

    /// Value of the metric for `record`, or `None` if the record is
    /// excluded by the join.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidPopulation`] if the record's area has
    /// a population that is not a whole number.
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&mut self, record: &IncidentRecord) -> Result<Option<f64>, AnalyticsError> {
        let months = match self.metric {
            Metric::Count => return Ok(Some(record.crime_count as f64)),
            Metric::RatePer1000 => 1,
            Metric::MonthlyRate => self.months,
        };

        // A zero count is a zero rate whatever the population.
        if record.crime_count == 0 {
            return Ok(Some(0.0));
        }

        let Some(population) = self.population.population(&record.lsoa_code) else {
            self.tally.unmatched(&record.lsoa_code);
            return Ok(None);
        };
        let rate = rate_per_1000(record.crime_count, population?, months);
        if rate.is_none() {
            self.tally.zero_population();
        }
        Ok(rate)
    }

    pub fn finish(self, context: &str) -> JoinReport {
        self.tally.finish(context)
    }
}
