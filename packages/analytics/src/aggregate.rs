//! Grouped summaries for the bar and pie charts.

use std::collections::BTreeMap;

use crime_dashboard_analytics_models::{
    AggregateQuery, AggregateResult, GroupBy, Metric, SummaryRow,
};
use crime_dashboard_crime_models::{
    CrimeType, DeprivationDecile, District, IncidentRecord, Period,
};

use crate::metric::MetricEvaluator;
use crate::{AnalyticsError, Dataset};

/// Group key for one summary row. Only one variant appears per query, so
/// the derived ordering is the dimension's natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    CrimeType(CrimeType),
    District(District),
    Decile(DeprivationDecile),
    Period(Period),
}

impl GroupKey {
    const fn of(record: &IncidentRecord, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::CrimeType => Self::CrimeType(record.crime_type),
            GroupBy::District => Self::District(record.district),
            GroupBy::Decile => Self::Decile(record.decile),
            GroupBy::Period => Self::Period(record.period),
        }
    }

    fn label(self) -> String {
        match self {
            Self::CrimeType(c) => c.to_string(),
            Self::District(d) => d.to_string(),
            Self::Decile(d) => d.to_string(),
            Self::Period(p) => p.label(),
        }
    }
}

/// Filters the dataset, drops zero counts, computes the metric per record
/// and sums it per group.
///
/// Rows are ordered by descending value (ties in the dimension's natural
/// order), or chronologically when grouping by period. An empty selection
/// gives an empty result.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPopulation`] if a rate is requested and
/// a matched area's population is not a whole number.
pub fn aggregate(
    dataset: &Dataset,
    query: &AggregateQuery,
) -> Result<AggregateResult, AnalyticsError> {
    let months = dataset.coverage().months_for(&query.filters.year);
    let mut evaluator = MetricEvaluator::new(dataset.population(), query.metric, months);
    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for record in dataset
        .filtered(&query.filters)
        .filter(|r| r.crime_count > 0)
    {
        if let Some(value) = evaluator.value(record)? {
            *groups
                .entry(GroupKey::of(record, query.group_by))
                .or_insert(0.0) += value;
        }
    }

    let mut rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(key, value)| SummaryRow {
            key: key.label(),
            value,
        })
        .collect();

    if !query.group_by.is_chronological() {
        // Stable sort keeps the natural order among equal values.
        rows.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    let total = rows.iter().map(|r| r.value).sum();

    log::debug!(
        "aggregate by {} ({}): {} groups, total {total}",
        query.group_by,
        query.metric,
        rows.len()
    );

    Ok(AggregateResult {
        rows,
        total,
        months_divisor: (query.metric == Metric::MonthlyRate).then_some(months),
        join: evaluator.finish("aggregate"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crime_dashboard_analytics_models::{RecordFilters, Selection};

    fn query(filters: RecordFilters, group_by: GroupBy, metric: Metric) -> AggregateQuery {
        AggregateQuery {
            filters,
            group_by,
            metric,
        }
    }

    fn burglary_2020() -> RecordFilters {
        RecordFilters {
            crime_type: Selection::parse("Burglary"),
            year: Selection::parse("2020"),
            district: Selection::parse("All Districts"),
            decile: Selection::parse("All Deprivation Deciles"),
        }
    }

    #[test]
    fn burglary_2020_counts_by_district() {
        let dataset = fixtures::dataset();
        let result = aggregate(
            &dataset,
            &query(burglary_2020(), GroupBy::District, Metric::Count),
        )
        .unwrap();

        let rows: Vec<(&str, f64)> = result
            .rows
            .iter()
            .map(|r| (r.key.as_str(), r.value))
            .collect();
        assert_eq!(
            rows,
            vec![("Preston", 4.0), ("Wyre", 3.0), ("Chorley", 2.0)]
        );
        assert!((result.total - 9.0).abs() < f64::EPSILON);
        assert_eq!(result.months_divisor, None);
        assert!(!result.join.has_exclusions());
    }

    #[test]
    fn zero_count_rows_are_dropped() {
        let dataset = fixtures::dataset();
        let result = aggregate(
            &dataset,
            &query(burglary_2020(), GroupBy::Period, Metric::Count),
        )
        .unwrap();
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        // February 2020 only has a zero-count row.
        assert_eq!(keys, vec!["2020-01", "2020-03"]);
    }

    #[test]
    fn rate_excludes_zero_population_areas() {
        let dataset = fixtures::dataset();
        let result = aggregate(
            &dataset,
            &query(burglary_2020(), GroupBy::District, Metric::RatePer1000),
        )
        .unwrap();

        // A: 4 / 2000 * 1000 = 2.0, B: 2 / 1000 * 1000 = 2.0, C excluded.
        let rows: Vec<(&str, f64)> = result
            .rows
            .iter()
            .map(|r| (r.key.as_str(), r.value))
            .collect();
        assert_eq!(rows, vec![("Chorley", 2.0), ("Preston", 2.0)]);
        assert_eq!(result.join.zero_population_rows, 1);
    }

    #[test]
    fn monthly_rate_over_all_years_divides_by_36() {
        let dataset = fixtures::dataset();
        let filters = RecordFilters {
            crime_type: Selection::parse("Shoplifting"),
            ..RecordFilters::default()
        };
        let result = aggregate(
            &dataset,
            &query(filters, GroupBy::CrimeType, Metric::MonthlyRate),
        )
        .unwrap();

        assert_eq!(result.months_divisor, Some(36));
        // 8 / 1000 * 1000 / 36 = 0.222...
        assert_eq!(result.rows.len(), 1);
        assert!((result.rows[0].value - 0.22).abs() < f64::EPSILON);
    }

    #[test]
    fn unmatched_areas_are_reported_not_fatal() {
        let dataset = fixtures::dataset();
        let filters = RecordFilters {
            crime_type: Selection::parse("Robbery"),
            ..RecordFilters::default()
        };
        let result = aggregate(
            &dataset,
            &query(filters, GroupBy::District, Metric::RatePer1000),
        )
        .unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.join.unmatched_rows, 1);
    }

    #[test]
    fn unknown_filter_value_gives_empty_result() {
        let dataset = fixtures::dataset();
        let filters = RecordFilters {
            district: Selection::parse("Atlantis"),
            ..RecordFilters::default()
        };
        let result = aggregate(&dataset, &query(filters, GroupBy::Decile, Metric::Count)).unwrap();
        assert!(result.rows.is_empty());
        assert!(result.total.abs() < f64::EPSILON);
    }

    #[test]
    fn grouped_sums_match_filtered_total() {
        let dataset = fixtures::dataset();
        for group_by in [
            GroupBy::CrimeType,
            GroupBy::District,
            GroupBy::Decile,
            GroupBy::Period,
        ] {
            let filters = RecordFilters::default();
            let expected: u64 = dataset.filtered(&filters).map(|r| r.crime_count).sum();
            let result = aggregate(&dataset, &query(filters, group_by, Metric::Count)).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = expected as f64;
            assert!((result.total - expected).abs() < 1e-9, "{group_by}");
        }
    }

    #[test]
    fn filtered_records_are_a_subset() {
        let dataset = fixtures::dataset();
        let filters = burglary_2020();
        for record in dataset.filtered(&filters) {
            assert!(dataset.records().contains(record));
            assert_eq!(record.crime_type, CrimeType::Burglary);
            assert_eq!(record.year(), 2020);
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let dataset = fixtures::dataset();
        let q = query(RecordFilters::default(), GroupBy::Decile, Metric::Count);
        assert_eq!(aggregate(&dataset, &q).unwrap(), aggregate(&dataset, &q).unwrap());
    }

    #[test]
    fn ties_keep_natural_order() {
        let dataset = fixtures::dataset();
        let result = aggregate(
            &dataset,
            &query(RecordFilters::default(), GroupBy::Decile, Metric::Count),
        )
        .unwrap();
        let keys: Vec<&str> = result.rows.iter().map(|r| r.key.as_str()).collect();
        // Decile 7: 2 + 5 + 8 = 15, decile 4: 6, decile 1: 4 + 1 = 5, decile 9: 3.
        assert_eq!(keys, vec!["7", "4", "1", "9"]);
    }

    #[test]
    fn single_decile_filter_keeps_only_that_decile() {
        let dataset = fixtures::dataset();
        let filters = RecordFilters {
            decile: Selection::parse("7"),
            ..RecordFilters::default()
        };
        let result = aggregate(
            &dataset,
            &query(filters, GroupBy::CrimeType, Metric::Count),
        )
        .unwrap();

        let rows: Vec<(&str, f64)> = result
            .rows
            .iter()
            .map(|r| (r.key.as_str(), r.value))
            .collect();
        // Only area B carries decile 7: shoplifting 8, burglary 2 + 5.
        assert_eq!(rows, vec![("Shoplifting", 8.0), ("Burglary", 7.0)]);
        assert!((result.total - 15.0).abs() < f64::EPSILON);
    }
}
