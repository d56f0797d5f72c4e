//! Strength and body-weight series for charts

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dates::{format_date, parse_date};
use crate::db::{MetricKind, WeightEntry, WorkoutEntry};

/// Number of points a chart shows by default
pub const DEFAULT_PROGRESS_LIMIT: usize = 7;

/// Chart-ready series, `labels[i]` pairs with `values[i]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ProgressSeries {
    fn from_points(points: Vec<(NaiveDate, f64)>, limit: usize) -> Self {
        let skip = points.len().saturating_sub(limit);
        let (labels, values) = points
            .into_iter()
            .skip(skip)
            .map(|(date, value)| (format_date(date), value))
            .unzip();
        Self { labels, values }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Change from first to last point
    pub fn change(&self) -> Option<f64> {
        Some(self.values.last()? - self.values.first()?)
    }
}

/// Best value per day for one body part, oldest first, last `limit` days
///
/// Only entries measured as `kind` count. Entries whose date doesn't
/// parse are skipped.
pub fn project(entries: &[WorkoutEntry], body_part: &str, kind: MetricKind, limit: usize) -> ProgressSeries {
    let mut best: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.body_part == body_part) {
        let Some(value) = entry.measurement().value_of(kind) else {
            continue;
        };
        let Some(date) = parse_date(&entry.date) else {
            continue;
        };
        best.entry(date)
            .and_modify(|max| *max = max.max(value))
            .or_insert(value);
    }

    ProgressSeries::from_points(best.into_iter().collect(), limit)
}

/// Body-weight readings oldest first, last `limit` readings
///
/// History is stored newest first, so same-day readings are reversed
/// before the (stable) date sort to keep them chronological.
pub fn weight_series(history: &[WeightEntry], limit: usize) -> ProgressSeries {
    let mut points: Vec<(NaiveDate, f64)> = history
        .iter()
        .rev()
        .filter_map(|entry| Some((parse_date(&entry.date)?, entry.kilograms()?)))
        .collect();
    points.sort_by_key(|(date, _)| *date);

    ProgressSeries::from_points(points, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Measurement;

    fn lift(date: &str, body_part: &str, measurement: Measurement) -> WorkoutEntry {
        WorkoutEntry::new(
            format!("{}-{}", date, body_part),
            date,
            body_part,
            "Bench Press",
            "10:00",
            measurement,
        )
    }

    fn weight(date: &str, kg: &str) -> WeightEntry {
        WeightEntry {
            weight: kg.to_string(),
            date: date.to_string(),
            timestamp: "08:00".to_string(),
        }
    }

    #[test]
    fn test_project_max_per_day() {
        let entries = vec![
            lift("2024-03-01", "Chest", Measurement::Weight(80.0)),
            lift("2024-03-01", "Chest", Measurement::Weight(85.0)),
            lift("2024-03-05", "Chest", Measurement::Weight(90.0)),
        ];
        let series = project(&entries, "Chest", MetricKind::Weight, DEFAULT_PROGRESS_LIMIT);
        assert_eq!(series.labels, vec!["2024-03-01", "2024-03-05"]);
        assert_eq!(series.values, vec![85.0, 90.0]);
    }

    #[test]
    fn test_project_empty() {
        let series = project(&[], "Chest", MetricKind::Weight, 7);
        assert!(series.is_empty());
        assert!(series.values.is_empty());
    }

    #[test]
    fn test_project_filters_body_part_and_kind() {
        let entries = vec![
            lift("2024-03-01", "Chest", Measurement::Weight(80.0)),
            lift("2024-03-02", "Back", Measurement::Weight(120.0)),
            lift("2024-03-03", "Chest", Measurement::Duration(30.0)),
            lift("2024-03-04", "Chest", Measurement::Unmeasured),
            lift("2024-03-05", "chest", Measurement::Weight(100.0)),
        ];
        let series = project(&entries, "Chest", MetricKind::Weight, 7);
        assert_eq!(series.labels, vec!["2024-03-01"]);
        assert_eq!(series.values, vec![80.0]);
    }

    #[test]
    fn test_project_sorts_chronologically() {
        // Stored newest first
        let entries = vec![
            lift("2024-01-10", "Legs", Measurement::Weight(120.0)),
            lift("2023-12-31", "Legs", Measurement::Weight(110.0)),
            lift("2023-12-01", "Legs", Measurement::Weight(100.0)),
        ];
        let series = project(&entries, "Legs", MetricKind::Weight, 7);
        assert_eq!(series.labels, vec!["2023-12-01", "2023-12-31", "2024-01-10"]);
    }

    #[test]
    fn test_project_keeps_last_n() {
        let entries: Vec<_> = (1..=10)
            .map(|d| lift(&format!("2024-03-{:02}", d), "Chest", Measurement::Weight(d as f64)))
            .collect();
        let series = project(&entries, "Chest", MetricKind::Weight, 7);
        assert_eq!(series.len(), 7);
        assert_eq!(series.labels.first().unwrap(), "2024-03-04");
        assert_eq!(series.values.last(), Some(&10.0));
    }

    #[test]
    fn test_project_fewer_than_limit() {
        let entries = vec![lift("2024-03-01", "Chest", Measurement::Weight(60.0))];
        assert_eq!(project(&entries, "Chest", MetricKind::Weight, 7).len(), 1);
    }

    #[test]
    fn test_project_zero_limit() {
        let entries = vec![lift("2024-03-01", "Chest", Measurement::Weight(60.0))];
        assert!(project(&entries, "Chest", MetricKind::Weight, 0).is_empty());
    }

    #[test]
    fn test_project_skips_bad_dates() {
        let entries = vec![
            lift("03/01/2024", "Chest", Measurement::Weight(200.0)),
            lift("2024-03-02", "Chest", Measurement::Weight(70.0)),
        ];
        let series = project(&entries, "Chest", MetricKind::Weight, 7);
        assert_eq!(series.values, vec![70.0]);
    }

    #[test]
    fn test_project_is_idempotent() {
        let entries = vec![
            lift("2024-03-01", "Chest", Measurement::Weight(80.0)),
            lift("2024-03-01", "Chest", Measurement::Weight(85.0)),
            lift("2024-03-05", "Chest", Measurement::Weight(90.0)),
            lift("2024-03-02", "Chest", Measurement::Weight(82.0)),
        ];
        let first = project(&entries, "Chest", MetricKind::Weight, 3);

        let replayed: Vec<_> = first
            .points()
            .map(|(date, v)| lift(date, "Chest", Measurement::Weight(v)))
            .collect();
        let second = project(&replayed, "Chest", MetricKind::Weight, 3);
        assert_eq!(first, second);
        assert!(second.len() <= 3);
    }

    #[test]
    fn test_project_duration() {
        let entries = vec![
            lift("2024-03-01", "Cardio", Measurement::Duration(20.0)),
            lift("2024-03-01", "Cardio", Measurement::Duration(35.0)),
        ];
        let series = project(&entries, "Cardio", MetricKind::Duration, 7);
        assert_eq!(series.values, vec![35.0]);
    }

    #[test]
    fn test_series_summary() {
        let entries = vec![
            lift("2024-03-01", "Chest", Measurement::Weight(80.0)),
            lift("2024-03-08", "Chest", Measurement::Weight(92.5)),
        ];
        let series = project(&entries, "Chest", MetricKind::Weight, 7);
        assert_eq!(series.max_value(), Some(92.5));
        assert_eq!(series.change(), Some(12.5));
        assert_eq!(ProgressSeries::default().change(), None);
    }

    #[test]
    fn test_weight_series_sorted_and_capped() {
        let history = vec![
            weight("2024-03-09", "74.0"),
            weight("2024-03-01", "76.0"),
            weight("2024-03-05", "75.0"),
        ];
        let series = weight_series(&history, 2);
        assert_eq!(series.labels, vec!["2024-03-05", "2024-03-09"]);
        assert_eq!(series.values, vec![75.0, 74.0]);
    }

    #[test]
    fn test_weight_series_same_day_chronological() {
        // Newest first: the 75.5 reading was logged after 76.0
        let history = vec![weight("2024-03-01", "75.5"), weight("2024-03-01", "76.0")];
        let series = weight_series(&history, 7);
        assert_eq!(series.values, vec![76.0, 75.5]);
    }

    #[test]
    fn test_weight_series_skips_malformed() {
        let history = vec![weight("2024-03-01", "abc"), weight("bad", "70"), weight("2024-03-02", "71")];
        let series = weight_series(&history, 7);
        assert_eq!(series.values, vec![71.0]);
    }
}
