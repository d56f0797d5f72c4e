//! CSV export of the workout history

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::dates::format_date;
use crate::db::WorkoutEntry;

pub const CSV_HEADER: &str = "Date,Body Part,Exercise,Time,Value,Value Type";

/// Commas would shift columns; they become spaces.
///
/// No quoting: quotes and newlines in free-form text pass through as-is.
fn strip_commas(field: &str) -> String {
    field.replace(',', " ")
}

/// Whole ledger as CSV, in collection order
pub fn to_csv(entries: &[WorkoutEntry]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for entry in entries {
        let value = entry.stored_value().unwrap_or_default();
        let value_type = entry.stored_value_type().unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            entry.date,
            strip_commas(&entry.body_part),
            strip_commas(&entry.exercise_name),
            strip_commas(&entry.timestamp),
            strip_commas(&value),
            strip_commas(&value_type),
        ));
    }

    csv
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("workout-history-{}.csv", format_date(today))
}

/// Write the export into `dir`, returns the file path
pub fn write_export(dir: &Path, entries: &[WorkoutEntry], today: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(export_file_name(today));
    fs::write(&path, to_csv(entries))
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    info!("Exported {} workouts to {}", entries.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Measurement;

    fn entry(body_part: &str, exercise: &str, measurement: Measurement) -> WorkoutEntry {
        WorkoutEntry::new("1", "2024-03-01", body_part, exercise, "09:30", measurement)
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(to_csv(&[]), "Date,Body Part,Exercise,Time,Value,Value Type\n");
    }

    #[test]
    fn test_rows() {
        let entries = vec![
            entry("Chest", "Bench Press", Measurement::Weight(82.5)),
            entry("Cardio", "Running", Measurement::Duration(30.0)),
            entry("Abs", "Plank", Measurement::Unmeasured),
        ];
        let csv = to_csv(&entries);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "2024-03-01,Chest,Bench Press,09:30,82.5,weight");
        assert_eq!(lines[2], "2024-03-01,Cardio,Running,09:30,30,duration");
        assert_eq!(lines[3], "2024-03-01,Abs,Plank,09:30,,");
    }

    #[test]
    fn test_commas_become_spaces() {
        let csv = to_csv(&[entry("Legs", "Squat, paused", Measurement::Weight(100.0))]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "2024-03-01,Legs,Squat  paused,09:30,100,weight");
        assert_eq!(row.split(',').count(), 6);
    }

    #[test]
    fn test_quotes_and_newlines_not_escaped() {
        // Known limitation: these characters are written verbatim
        let csv = to_csv(&[entry("Legs", "\"Box\"\nSquat", Measurement::Unmeasured)]);
        assert!(csv.contains("\"Box\"\nSquat"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_stored_value_exported_as_written() {
        let json = r#"{"id":"1","date":"2024-03-01","bodyPart":"Chest","exerciseName":"Fly","timestamp":"09:00","value":"heavy","valueType":"weight"}"#;
        let entry: WorkoutEntry = serde_json::from_str(json).unwrap();
        let csv = to_csv(&[entry]);
        assert_eq!(csv.lines().nth(1), Some("2024-03-01,Chest,Fly,09:00,heavy,weight"));
    }

    #[test]
    fn test_export_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_file_name(today), "workout-history-2024-03-05.csv");
    }

    #[test]
    fn test_write_export() {
        let dir = std::env::temp_dir().join(format!("liftlog-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let entries = vec![entry("Chest", "Bench Press", Measurement::Weight(80.0))];
        let path = write_export(&dir, &entries, today).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), to_csv(&entries));

        fs::remove_dir_all(&dir).unwrap();
    }
}
