//! Session - the in-memory ledger and the current calendar view
//!
//! The session's collections are the source of truth while it runs. The
//! store mirrors them: read once in `load`, written after every mutation.
//! A failed write never rolls back the in-memory change.

use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Local, NaiveDate};
use tracing::{error, info};

use crate::calendar::{DayCell, build_month};
use crate::dates::{YearMonth, format_date, parse_date};
use crate::db::records::parse_amount;
use crate::db::{
    KeyValueStore, Measurement, MetricKind, StoreError, WeightEntry, WorkoutEntry, load_custom_exercises,
    load_weight_history, load_workouts, save_custom_exercises, save_weight_history, save_workouts,
};
use crate::exercises::{ExerciseCatalog, builtin_catalog, merge};
use crate::stats::{GroupedWorkouts, ProgressSeries, dates_with_entries, group_by_date, project, weight_series};

/// Whether a mutation reached the store
#[derive(Debug)]
#[must_use]
pub enum Persistence {
    Saved,
    /// Kept in memory only until the next successful write
    Unsaved(StoreError),
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }

    /// Non-blocking message for the user, if any
    pub fn notice(&self) -> Option<String> {
        match self {
            Persistence::Saved => None,
            Persistence::Unsaved(e) => Some(format!("Saved for this session only, storage failed: {}", e)),
        }
    }

    /// First failure wins
    fn and(self, other: Persistence) -> Persistence {
        match self {
            Persistence::Saved => other,
            unsaved => unsaved,
        }
    }
}

fn persisted(result: Result<(), StoreError>, what: &str) -> Persistence {
    match result {
        Ok(()) => Persistence::Saved,
        Err(e) => {
            error!("Failed to save {}: {}", what, e);
            Persistence::Unsaved(e)
        }
    }
}

pub struct Session<S: KeyValueStore> {
    store: S,
    builtin: ExerciseCatalog,
    workouts: Vec<WorkoutEntry>,
    weight_history: Vec<WeightEntry>,
    custom_exercises: ExerciseCatalog,
    selected_date: String,
    month: YearMonth,
}

impl<S: KeyValueStore> Session<S> {
    /// Load everything from the store; unreadable data starts empty
    pub fn load(store: S, today: NaiveDate) -> Self {
        let workouts = load_workouts(&store);
        let weight_history = load_weight_history(&store);
        let custom_exercises = load_custom_exercises(&store);
        info!(
            "Loaded {} workouts, {} weight entries, {} custom body parts",
            workouts.len(),
            weight_history.len(),
            custom_exercises.len()
        );

        Self {
            store,
            builtin: builtin_catalog(),
            workouts,
            weight_history,
            custom_exercises,
            selected_date: format_date(today),
            month: YearMonth::of(today),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn workouts(&self) -> &[WorkoutEntry] {
        &self.workouts
    }

    pub fn weight_history(&self) -> &[WeightEntry] {
        &self.weight_history
    }

    pub fn custom_exercises(&self) -> &ExerciseCatalog {
        &self.custom_exercises
    }

    /// Built-in exercises merged with the user's own
    pub fn catalog(&self) -> ExerciseCatalog {
        merge(&self.builtin, &self.custom_exercises)
    }

    /// Log a workout set dated `now`'s local calendar day
    ///
    /// `value` is kilograms, or minutes for cardio. An exercise missing
    /// from the catalog is remembered as a custom exercise.
    pub fn log_workout(
        &mut self,
        body_part: &str,
        exercise_name: &str,
        value: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Persistence> {
        let body_part = body_part.trim();
        let exercise_name = exercise_name.trim();
        if body_part.is_empty() {
            bail!("body part must not be empty");
        }
        if exercise_name.is_empty() {
            bail!("exercise name must not be empty");
        }

        let kind = MetricKind::for_body_part(body_part);
        let measurement = match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Measurement::Unmeasured,
            Some(raw) => match parse_amount(raw) {
                Some(amount) if amount >= 0.0 => Measurement::new(kind, amount),
                Some(_) => bail!("{} must not be negative", kind.as_str()),
                None => bail!("'{}' is not a number", raw),
            },
        };

        let mut outcome = Persistence::Saved;
        if !self.catalog().contains(body_part, exercise_name) {
            outcome = self.add_custom_exercise(body_part, exercise_name);
        }

        let entry = WorkoutEntry::new(
            self.next_id(now),
            format_date(now.date_naive()),
            body_part,
            exercise_name,
            now.format("%H:%M").to_string(),
            measurement,
        );
        info!("Logged {} / {} ({:?})", entry.body_part, entry.exercise_name, measurement);
        self.workouts.insert(0, entry);

        Ok(outcome.and(persisted(save_workouts(&self.store, &self.workouts), "workouts")))
    }

    /// Creation time in milliseconds, bumped past any id already taken
    fn next_id(&self, now: DateTime<Local>) -> String {
        let mut millis = now.timestamp_millis();
        while self.workouts.iter().any(|w| w.id == millis.to_string()) {
            millis += 1;
        }
        millis.to_string()
    }

    pub fn delete_workout(&mut self, id: &str) -> Result<Persistence> {
        let Some(pos) = self.workouts.iter().position(|w| w.id == id) else {
            bail!("no workout with id {}", id);
        };
        let removed = self.workouts.remove(pos);
        info!("Deleted workout {} ({})", removed.id, removed.exercise_name);
        Ok(persisted(save_workouts(&self.store, &self.workouts), "workouts"))
    }

    /// Record a body-weight reading in kilograms
    pub fn log_body_weight(&mut self, weight: &str, now: DateTime<Local>) -> Result<Persistence> {
        let weight = weight.trim();
        if weight.is_empty() {
            bail!("weight must not be empty");
        }
        match parse_amount(weight) {
            Some(kg) if kg > 0.0 => {}
            Some(_) => bail!("weight must be positive"),
            None => bail!("'{}' is not a number", weight),
        }

        self.weight_history.insert(
            0,
            WeightEntry {
                weight: weight.to_string(),
                date: format_date(now.date_naive()),
                timestamp: now.format("%H:%M").to_string(),
            },
        );
        info!("Logged body weight {}", weight);
        Ok(persisted(save_weight_history(&self.store, &self.weight_history), "weight history"))
    }

    /// Remove a reading by its position in the newest-first history
    pub fn delete_body_weight(&mut self, index: usize) -> Result<Persistence> {
        if index >= self.weight_history.len() {
            bail!("no weight entry at index {} ({} recorded)", index, self.weight_history.len());
        }
        let removed = self.weight_history.remove(index);
        info!("Deleted weight entry {} from {}", removed.weight, removed.date);
        Ok(persisted(save_weight_history(&self.store, &self.weight_history), "weight history"))
    }

    /// Remember a custom exercise; no-op when already listed
    pub fn add_custom_exercise(&mut self, body_part: &str, name: &str) -> Persistence {
        let body_part = body_part.trim();
        let name = name.trim();
        if self.catalog().contains(body_part, name) {
            return Persistence::Saved;
        }
        let updated = self.custom_exercises.clone().add_custom_exercise(body_part, name);
        if updated == self.custom_exercises {
            return Persistence::Saved;
        }
        self.custom_exercises = updated;
        info!("Added custom exercise {} / {}", body_part, name);
        persisted(save_custom_exercises(&self.store, &self.custom_exercises), "custom exercises")
    }

    pub fn grouped(&self) -> GroupedWorkouts {
        group_by_date(&self.workouts)
    }

    /// Entries for one date, newest first
    pub fn workouts_on(&self, date: &str) -> Vec<&WorkoutEntry> {
        self.workouts.iter().filter(|w| w.date == date).collect()
    }

    /// Calendar cells for the displayed month
    pub fn month_grid(&self, today: NaiveDate) -> Vec<DayCell> {
        let dates = dates_with_entries(&self.grouped(), self.month);
        build_month(self.month, &dates, &self.selected_date, today)
    }

    /// Best value per day for a body part, in the unit it's logged in
    pub fn progress(&self, body_part: &str, limit: usize) -> ProgressSeries {
        project(&self.workouts, body_part, MetricKind::for_body_part(body_part), limit)
    }

    pub fn weight_trend(&self, limit: usize) -> ProgressSeries {
        weight_series(&self.weight_history, limit)
    }

    pub fn selected_date(&self) -> &str {
        &self.selected_date
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Select a date and show its month
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = format_date(date);
        self.month = YearMonth::of(date);
    }

    /// Move the selection by `delta` days
    pub fn select_relative_day(&mut self, delta: i64) {
        let current = parse_date(&self.selected_date).unwrap_or_else(|| self.month.first_day());
        if let Some(date) = current.checked_add_signed(Duration::days(delta)) {
            self.select_date(date);
        }
    }

    /// Show the previous month; the selection stays where it is
    pub fn previous_month(&mut self) {
        self.month = self.month.previous();
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
    }

    pub fn show_month(&mut self, month: YearMonth) {
        self.month = month;
    }
}
