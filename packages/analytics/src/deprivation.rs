//! Crime count against IMD score, one point per area per year.

use std::collections::BTreeMap;

use crime_dashboard_analytics_models::{
    DeprivationPoint, DeprivationQuery, DeprivationResult, RecordFilters, Selection,
};
use crime_dashboard_crime_models::{District, LsoaCode};

use crate::metric::JoinTally;
use crate::{AnalyticsError, Dataset};

/// Sums crime counts per `(area, year)` and inner-joins population and IMD
/// score. Areas missing from either reference table are dropped and
/// reported.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPopulation`] if a matched area's
/// population is not a whole number.
pub fn deprivation_scatter(
    dataset: &Dataset,
    query: &DeprivationQuery,
) -> Result<DeprivationResult, AnalyticsError> {
    let filters = RecordFilters {
        crime_type: query.crime_type.clone(),
        year: query.year.clone(),
        district: query.district.clone(),
        decile: Selection::All,
    };

    let mut per_area: BTreeMap<(LsoaCode, i32), (District, u64)> = BTreeMap::new();
    for record in dataset.filtered(&filters) {
        per_area
            .entry((record.lsoa_code.clone(), record.year()))
            .or_insert((record.district, 0))
            .1 += record.crime_count;
    }

    let mut tally = JoinTally::default();
    let mut points = Vec::with_capacity(per_area.len());

    for ((lsoa_code, year), (district, crime_count)) in per_area {
        if crime_count == 0 {
            continue;
        }
        let Some(population) = dataset.population().population(&lsoa_code) else {
            tally.unmatched(&lsoa_code);
            continue;
        };
        let population = population?;
        let Some(score) = dataset.deprivation().get(&lsoa_code) else {
            tally.unmatched(&lsoa_code);
            continue;
        };
        points.push(DeprivationPoint {
            lsoa_code,
            district,
            year,
            crime_count,
            population,
            imd_score: score.score,
        });
    }

    Ok(DeprivationResult {
        points,
        join: tally.finish("deprivation scatter"),
    })
}
