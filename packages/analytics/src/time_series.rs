//! Monthly time series, optionally split into one line per crime type or
//! district.

use std::collections::BTreeMap;

use crime_dashboard_analytics_models::{
    SeriesSplit, TimeSeriesPoint, TimeSeriesQuery, TimeSeriesResult,
};
use crime_dashboard_crime_models::{IncidentRecord, Period};

use crate::metric::MetricEvaluator;
use crate::{AnalyticsError, Dataset};

fn series_label(record: &IncidentRecord, split: Option<SeriesSplit>) -> Option<String> {
    split.map(|split| match split {
        SeriesSplit::CrimeType => record.crime_type.to_string(),
        SeriesSplit::District => record.district.to_string(),
    })
}

/// Sums the metric per month (and per series when split).
///
/// Zero-count records are kept so a month whose total is zero still shows
/// up as a zero point. Each point covers one month, so
/// [`Metric::MonthlyRate`](crime_dashboard_analytics_models::Metric::MonthlyRate)
/// is the plain rate here.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPopulation`] if a rate is requested and
/// a matched area's population is not a whole number.
pub fn time_series(
    dataset: &Dataset,
    query: &TimeSeriesQuery,
) -> Result<TimeSeriesResult, AnalyticsError> {
    let mut evaluator = MetricEvaluator::new(dataset.population(), query.metric, 1);
    let mut buckets: BTreeMap<(Period, Option<String>), f64> = BTreeMap::new();

    for record in dataset.filtered(&query.filters) {
        if let Some(value) = evaluator.value(record)? {
            *buckets
                .entry((record.period, series_label(record, query.split)))
                .or_insert(0.0) += value;
        }
    }

    let points: Vec<TimeSeriesPoint> = buckets
        .into_iter()
        .map(|((period, series), value)| TimeSeriesPoint {
            period: period.label(),
            series,
            value,
        })
        .collect();

    log::debug!("time series ({}): {} points", query.metric, points.len());

    Ok(TimeSeriesResult {
        points,
        join: evaluator.finish("time series"),
    })
}
