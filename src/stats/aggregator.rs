//! Grouping of workout entries by calendar date

use std::collections::{BTreeMap, BTreeSet};

use crate::dates::{YearMonth, parse_date};
use crate::db::WorkoutEntry;

/// Entries per exact `date` string
pub type GroupedWorkouts = BTreeMap<String, Vec<WorkoutEntry>>;

/// Partition entries by date, keeping input order inside each group
pub fn group_by_date(entries: &[WorkoutEntry]) -> GroupedWorkouts {
    let mut groups = GroupedWorkouts::new();
    for entry in entries {
        groups.entry(entry.date.clone()).or_default().push(entry.clone());
    }
    groups
}

/// Dates in `month` that have at least one entry
///
/// Keys that are not valid `YYYY-MM-DD` dates never match.
pub fn dates_with_entries(grouped: &GroupedWorkouts, month: YearMonth) -> BTreeSet<String> {
    grouped
        .iter()
        .filter(|(_, entries)| !entries.is_empty())
        .filter(|(date, _)| parse_date(date).is_some_and(|d| month.contains(d)))
        .map(|(date, _)| date.clone())
        .collect()
}
