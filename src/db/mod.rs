//! Database module - key-value storage for the workout ledger
//!
//! Every collection is stored whole under its own key as a JSON blob.
//! There are no partial queries: load reads a key, save overwrites it.

pub mod records;

use std::cell::RefCell;
use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::exercises::ExerciseCatalog;
pub use records::{CARDIO, Measurement, MetricKind, WeightEntry, WorkoutEntry};

pub const WORKOUTS_KEY: &str = "workouts";
pub const WEIGHT_HISTORY_KEY: &str = "weightHistory";
pub const CUSTOM_EXERCISES_KEY: &str = "customExercises";
pub const USER_NAME_KEY: &str = "userName";
pub const MEASUREMENT_SYSTEM_KEY: &str = "measurementSystem";
pub const DARK_MODE_KEY: &str = "darkMode";

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Opaque string store, one independent value per key
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// SQLite-backed store
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Private database that lives as long as the value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Volatile store, nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a JSON blob, treating any failure as "no data"
fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored {} is not valid JSON, starting empty: {}", key, e);
            T::default()
        }
    }
}

/// Read a JSON array record by record; one bad record doesn't cost the rest
fn load_records<T, S>(store: &S, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let records: Vec<Value> = load_json(store, key);
    let total = records.len();
    let loaded: Vec<T> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable {} record #{}: {}", key, i, e);
                None
            }
        })
        .collect();
    if loaded.len() < total {
        warn!("Loaded {} of {} {} records", loaded.len(), total, key);
    }
    loaded
}

fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)?;
    debug!("Saved {} ({} bytes)", key, raw.len());
    Ok(())
}

pub fn load_workouts<S: KeyValueStore + ?Sized>(store: &S) -> Vec<WorkoutEntry> {
    load_records(store, WORKOUTS_KEY)
}

pub fn save_workouts<S: KeyValueStore + ?Sized>(store: &S, workouts: &[WorkoutEntry]) -> Result<(), StoreError> {
    save_json(store, WORKOUTS_KEY, workouts)
}

pub fn load_weight_history<S: KeyValueStore + ?Sized>(store: &S) -> Vec<WeightEntry> {
    load_records(store, WEIGHT_HISTORY_KEY)
}

pub fn save_weight_history<S: KeyValueStore + ?Sized>(store: &S, history: &[WeightEntry]) -> Result<(), StoreError> {
    save_json(store, WEIGHT_HISTORY_KEY, history)
}

/// Custom exercises only; built-ins are never persisted
pub fn load_custom_exercises<S: KeyValueStore + ?Sized>(store: &S) -> ExerciseCatalog {
    load_json(store, CUSTOM_EXERCISES_KEY)
}

pub fn save_custom_exercises<S: KeyValueStore + ?Sized>(store: &S, custom: &ExerciseCatalog) -> Result<(), StoreError> {
    save_json(store, CUSTOM_EXERCISES_KEY, custom)
}

/// Plain string value, read failures become `None`
pub fn load_string<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, date: &str) -> WorkoutEntry {
        WorkoutEntry::new(id, date, "Chest", "Bench Press", "10:00", Measurement::Weight(80.0))
    }

    #[test]
    fn test_sqlite_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("workouts").unwrap(), None);
    }

    #[test]
    fn test_sqlite_set_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set("userName", "Ann").unwrap();
        db.set("userName", "Bob").unwrap();
        assert_eq!(db.get("userName").unwrap().as_deref(), Some("Bob"));
    }

    #[test]
    fn test_workouts_roundtrip_through_sqlite() {
        let db = Database::open_in_memory().unwrap();
        let workouts = vec![entry("2", "2024-03-02"), entry("1", "2024-03-01")];
        save_workouts(&db, &workouts).unwrap();
        assert_eq!(load_workouts(&db), workouts);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = MemoryStore::new();
        assert!(load_workouts(&store).is_empty());
        assert!(load_weight_history(&store).is_empty());
        assert!(load_custom_exercises(&store).is_empty());
    }

    #[test]
    fn test_load_malformed_json_is_empty() {
        let store = MemoryStore::new();
        store.set(WORKOUTS_KEY, "{not json").unwrap();
        store.set(WEIGHT_HISTORY_KEY, "42").unwrap();
        assert!(load_workouts(&store).is_empty());
        assert!(load_weight_history(&store).is_empty());
    }

    #[test]
    fn test_weight_history_keeps_order() {
        let store = MemoryStore::new();
        let history = vec![
            WeightEntry { weight: "74".into(), date: "2024-03-02".into(), timestamp: "08:00".into() },
            WeightEntry { weight: "75".into(), date: "2024-03-01".into(), timestamp: "08:00".into() },
        ];
        save_weight_history(&store, &history).unwrap();
        assert_eq!(load_weight_history(&store), history);
    }

    #[test]
    fn test_custom_exercises_roundtrip() {
        let store = MemoryStore::new();
        let custom = ExerciseCatalog::new().add_custom_exercise("Legs", "Zercher Squat");
        save_custom_exercises(&store, &custom).unwrap();
        assert_eq!(
            store.get(CUSTOM_EXERCISES_KEY).unwrap().as_deref(),
            Some(r#"{"Legs":["Zercher Squat"]}"#)
        );
        assert_eq!(load_custom_exercises(&store), custom);
    }

    #[test]
    fn test_reads_camel_case_layout() {
        let store = MemoryStore::new();
        store
            .set(
                WORKOUTS_KEY,
                r#"[{"id":"1718000000000","date":"2024-06-10","bodyPart":"Back","exerciseName":"Deadlift","value":"140","valueType":"weight","timestamp":"06:45 PM"}]"#,
            )
            .unwrap();
        let workouts = load_workouts(&store);
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].measurement(), Measurement::Weight(140.0));
        assert_eq!(workouts[0].timestamp, "06:45 PM");
    }

    #[test]
    fn test_one_bad_record_keeps_the_rest() {
        let store = MemoryStore::new();
        store
            .set(
                WORKOUTS_KEY,
                r#"[
                    {"id":"3","date":"2024-03-03","bodyPart":"Chest","exerciseName":"Fly","timestamp":"09:00"},
                    {"id":"2","bodyPart":"Chest","exerciseName":"Fly","timestamp":"09:00"},
                    {"id":"1","date":"2024-03-01","bodyPart":"Back","exerciseName":"Row","timestamp":"09:00","value":140,"valueType":"weight"}
                ]"#,
            )
            .unwrap();
        let workouts = load_workouts(&store);
        let ids: Vec<_> = workouts.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(workouts[1].measurement(), Measurement::Weight(140.0));
    }

    #[test]
    fn test_weight_history_skips_bad_record() {
        let store = MemoryStore::new();
        store
            .set(
                WEIGHT_HISTORY_KEY,
                r#"[{"weight":74,"date":"2024-03-02"},{"weight":null,"date":"2024-03-01"}]"#,
            )
            .unwrap();
        let history = load_weight_history(&store);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].weight, "74");
    }
}
