//! Month grid for the history calendar

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::dates::{YearMonth, format_date};

/// One day of the month view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub date: String,
    pub weekday: Weekday,
    pub has_entry: bool,
    pub is_selected: bool,
    pub is_today: bool,
}

/// One cell per day of `month`, ascending
///
/// `selected_date` is compared as a string, so a malformed selection
/// simply selects nothing.
pub fn build_month(
    month: YearMonth,
    dates_with_entries: &BTreeSet<String>,
    selected_date: &str,
    today: NaiveDate,
) -> Vec<DayCell> {
    let today_in_month = month.contains(today);

    (1..=month.days())
        .filter_map(|day| month.day(day))
        .map(|date| {
            let date_str = format_date(date);
            DayCell {
                day: date.day(),
                weekday: date.weekday(),
                has_entry: dates_with_entries.contains(&date_str),
                is_selected: date_str == selected_date,
                is_today: today_in_month && date.day() == today.day(),
                date: date_str,
            }
        })
        .collect()
}
