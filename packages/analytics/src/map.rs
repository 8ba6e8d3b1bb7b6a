//! Map markers, one per filtered record.

use crime_dashboard_analytics_models::{MapPoint, MapQuery, MapResult, Metric};

use crate::metric::MetricEvaluator;
use crate::{AnalyticsError, Dataset};

/// Builds one marker per record that passes the filters and has a non-zero
/// count. With a rate metric, records the population join excludes get no
/// marker.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPopulation`] if a rate is requested and
/// a matched area's population is not a whole number.
pub fn map_points(dataset: &Dataset, query: &MapQuery) -> Result<MapResult, AnalyticsError> {
    let months = dataset.coverage().months_for(&query.filters.year);
    let mut evaluator = MetricEvaluator::new(dataset.population(), query.metric, months);
    let mut points = Vec::new();

    for record in dataset
        .filtered(&query.filters)
        .filter(|r| r.crime_count > 0)
    {
        let rate = if query.metric == Metric::Count {
            None
        } else {
            match evaluator.value(record)? {
                Some(rate) => Some(rate),
                None => continue,
            }
        };
        points.push(MapPoint {
            lsoa_code: record.lsoa_code.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            crime_count: record.crime_count,
            rate,
        });
    }

    let max_value = points.iter().map(MapPoint::value).reduce(f64::max);

    Ok(MapResult {
        points,
        max_value,
        center: dataset.center(),
        join: evaluator.finish("map"),
    })
}
