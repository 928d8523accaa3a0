//! Top-category monthly time series.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use la_crime_analytics_models::{CategorySeries, MonthCount, MonthKey, MonthlySeries, SeriesParams};
use la_crime_incident_models::IncidentRecord;

/// Returns every calendar month from `start`'s month through `end`'s month,
/// inclusive. Empty when `end` falls in an earlier month than `start`.
#[must_use]
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Vec<MonthKey> {
    let last = MonthKey::from_date(end);
    let mut months = Vec::new();
    let mut current = MonthKey::from_date(start);

    while current <= last {
        months.push(current);
        match current.next() {
            Some(next) => current = next,
            None => break,
        }
    }

    months
}

/// Counts records per category and returns the `n` most frequent as
/// `(category, count)` pairs.
///
/// Uncategorized records are ignored. Ties keep the order in which the
/// categories were first encountered in `records`.
#[must_use]
pub fn top_categories(records: &[IncidentRecord], n: usize) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();

    for category in records.iter().filter_map(IncidentRecord::category) {
        if let Some(&i) = index.get(category) {
            counts[i].1 += 1;
        } else {
            index.insert(category, counts.len());
            counts.push((category, 1));
        }
    }

    // Stable sort: equal counts stay in encounter order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);

    counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect()
}

/// Builds month-bucketed counts for the `params.top_n` most frequent
/// categories over the inclusive month range `[params.start, params.end]`.
///
/// Categories are selected from the whole snapshot, not just the range.
/// Each selected category gets exactly one [`MonthCount`] per month in
/// range, zero-filled. An empty snapshot or an inverted range yields a
/// result with no series.
#[must_use]
pub fn top_category_monthly_series(
    records: &[IncidentRecord],
    params: &SeriesParams,
) -> MonthlySeries {
    let mut result = MonthlySeries {
        stacked: params.stack,
        series: Vec::new(),
    };

    let months = month_range(params.start, params.end);
    if records.is_empty() || months.is_empty() {
        log::debug!(
            "No series for {}..{}: {} records, {} months",
            params.start,
            params.end,
            records.len(),
            months.len()
        );
        return result;
    }

    let top = top_categories(records, params.top_n);
    let mut buckets: HashMap<&str, BTreeMap<MonthKey, u64>> = top
        .iter()
        .map(|(category, _)| (category.as_str(), BTreeMap::new()))
        .collect();

    for record in records {
        let Some(months_for_category) = record.category().and_then(|c| buckets.get_mut(c)) else {
            continue;
        };
        *months_for_category
            .entry(MonthKey::from_datetime(&record.arrest_date))
            .or_insert(0) += 1;
    }

    for (category, _) in &top {
        let counts = buckets.get(category.as_str());
        let points = months
            .iter()
            .map(|month| MonthCount {
                month: month.first_day(),
                count: counts.and_then(|c| c.get(month)).copied().unwrap_or(0),
            })
            .collect();
        result.series.push(CategorySeries {
            category: category.clone(),
            points,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(id: &str, category: Option<&str>, y: i32, m: u32, d: u32) -> IncidentRecord {
        IncidentRecord {
            report_id: id.to_string(),
            arrest_date: date(y, m, d).and_hms_opt(13, 45, 0).unwrap(),
            category: category.map(ToString::to_string),
            area_description: None,
            location: None,
        }
    }

    fn sample() -> Vec<IncidentRecord> {
        vec![
            rec("1", Some("Homicide"), 2019, 11, 5),
            rec("2", Some("Homicide"), 2019, 11, 20),
            rec("3", Some("Narcotic Drug Laws"), 2019, 12, 1),
        ]
    }

    #[test]
    fn month_range_includes_end_month_with_differing_days() {
        let months = month_range(date(2019, 7, 25), date(2019, 11, 3));
        let firsts: Vec<_> = months.iter().map(|m| m.first_day()).collect();
        assert_eq!(
            firsts,
            vec![
                date(2019, 7, 1),
                date(2019, 8, 1),
                date(2019, 9, 1),
                date(2019, 10, 1),
                date(2019, 11, 1),
            ]
        );
    }

    #[test]
    fn month_range_spans_long_ranges_by_calendar_month() {
        // 30-day stepping would drift and drop a month over this span.
        let months = month_range(date(2018, 1, 31), date(2019, 12, 1));
        assert_eq!(months.len(), 24);
        assert_eq!(months.last().unwrap().first_day(), date(2019, 12, 1));
    }

    #[test]
    fn month_range_single_and_inverted() {
        assert_eq!(month_range(date(2019, 3, 2), date(2019, 3, 30)).len(), 1);
        assert!(month_range(date(2019, 4, 1), date(2019, 3, 31)).is_empty());
    }

    #[test]
    fn top_categories_ranks_by_count_and_skips_missing() {
        let mut records = sample();
        records.push(rec("4", None, 2019, 11, 1));
        records.push(rec("5", None, 2019, 11, 1));
        records.push(rec("6", None, 2019, 11, 1));

        let top = top_categories(&records, 5);
        assert_eq!(
            top,
            vec![
                ("Homicide".to_string(), 2),
                ("Narcotic Drug Laws".to_string(), 1)
            ]
        );
    }

    #[test]
    fn top_categories_breaks_ties_by_encounter_order() {
        let records = vec![
            rec("1", Some("Robbery"), 2019, 1, 1),
            rec("2", Some("Burglary"), 2019, 1, 1),
            rec("3", Some("Burglary"), 2019, 1, 1),
            rec("4", Some("Robbery"), 2019, 1, 1),
            rec("5", Some("Arson"), 2019, 1, 1),
        ];
        let names: Vec<String> = top_categories(&records, 2)
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(names, vec!["Robbery", "Burglary"]);
    }

    #[test]
    fn example_series_matches_expected_counts() {
        let params = SeriesParams::new(date(2019, 11, 1), date(2019, 12, 1)).with_top_n(2);
        let result = top_category_monthly_series(&sample(), &params);

        assert_eq!(result.categories(), vec!["Homicide", "Narcotic Drug Laws"]);

        let homicide = result.get("Homicide").unwrap();
        assert_eq!(
            homicide.points,
            vec![
                MonthCount {
                    month: date(2019, 11, 1),
                    count: 2
                },
                MonthCount {
                    month: date(2019, 12, 1),
                    count: 0
                },
            ]
        );

        let narcotics = result.get("Narcotic Drug Laws").unwrap();
        assert_eq!(
            narcotics.points.iter().map(|p| p.count).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn every_series_has_one_point_per_month() {
        let mut records = sample();
        for (i, cat) in ["A", "B", "C", "D", "E", "F"].iter().enumerate() {
            records.push(rec(&format!("x{i}"), Some(cat), 2019, 8, 1));
        }
        let params = SeriesParams::new(date(2019, 7, 1), date(2019, 11, 19));
        let result = top_category_monthly_series(&records, &params);

        assert_eq!(result.series.len(), 5);
        for series in &result.series {
            assert_eq!(series.points.len(), 5);
            assert!(series.points.windows(2).all(|w| w[0].month < w[1].month));
        }
    }

    #[test]
    fn totals_match_in_range_records() {
        let mut records = sample();
        // Outside the requested range; selected category but not counted.
        records.push(rec("7", Some("Homicide"), 2020, 1, 15));
        let params = SeriesParams::new(date(2019, 11, 1), date(2019, 12, 31));
        let result = top_category_monthly_series(&records, &params);

        assert_eq!(result.get("Homicide").unwrap().total(), 2);
        assert_eq!(result.get("Narcotic Drug Laws").unwrap().total(), 1);
    }

    #[test]
    fn fewer_categories_than_requested() {
        let params = SeriesParams::new(date(2019, 11, 1), date(2019, 12, 1));
        let result = top_category_monthly_series(&sample(), &params);
        assert_eq!(result.series.len(), 2);
    }

    #[test]
    fn empty_input_and_inverted_range_are_empty() {
        let params = SeriesParams::new(date(2019, 11, 1), date(2019, 12, 1)).with_stack(true);
        let result = top_category_monthly_series(&[], &params);
        assert!(result.is_empty());
        assert!(result.stacked);

        let inverted = SeriesParams::new(date(2019, 12, 1), date(2019, 11, 1));
        assert!(top_category_monthly_series(&sample(), &inverted).is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let params = SeriesParams::new(date(2019, 11, 1), date(2019, 12, 1));
        let records = sample();
        assert_eq!(
            top_category_monthly_series(&records, &params),
            top_category_monthly_series(&records, &params)
        );
    }
}
