//! User preferences stored as plain strings next to the ledger
//!
//! `main` builds one `Settings` at startup and hands it to whatever needs
//! it. Nothing reads preferences from global state.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::db::{
    DARK_MODE_KEY, KeyValueStore, MEASUREMENT_SYSTEM_KEY, StoreError, USER_NAME_KEY, load_string,
};

const POUNDS_PER_KILOGRAM: f64 = 2.204_622_6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementSystem {
    #[default]
    Metric,
    Imperial,
}

impl MeasurementSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "metric",
            MeasurementSystem::Imperial => "imperial",
        }
    }

    pub fn weight_unit(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "kg",
            MeasurementSystem::Imperial => "lb",
        }
    }

    /// Kilograms converted for display
    pub fn display_weight(&self, kg: f64) -> f64 {
        match self {
            MeasurementSystem::Metric => kg,
            MeasurementSystem::Imperial => kg * POUNDS_PER_KILOGRAM,
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(MeasurementSystem::Metric),
            "imperial" => Ok(MeasurementSystem::Imperial),
            other => Err(format!("unknown measurement system '{}', use metric or imperial", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub dark_mode: bool,
    pub measurement_system: MeasurementSystem,
    pub user_name: String,
}

impl Settings {
    /// Read preferences, unknown or unreadable values fall back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let dark_mode = load_string(store, DARK_MODE_KEY).as_deref() == Some("true");
        let measurement_system = match load_string(store, MEASUREMENT_SYSTEM_KEY).as_deref() {
            Some("imperial") => MeasurementSystem::Imperial,
            _ => MeasurementSystem::Metric,
        };
        let user_name = load_string(store, USER_NAME_KEY).unwrap_or_default();

        Self {
            dark_mode,
            measurement_system,
            user_name,
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        store.set(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })?;
        store.set(MEASUREMENT_SYSTEM_KEY, self.measurement_system.as_str())?;
        store.set(USER_NAME_KEY, &self.user_name)?;
        Ok(())
    }

    /// Flip dark mode and persist just that flag
    pub fn toggle_dark_mode<S: KeyValueStore + ?Sized>(&mut self, store: &S) -> Result<(), StoreError> {
        self.dark_mode = !self.dark_mode;
        info!("Dark mode {}", if self.dark_mode { "on" } else { "off" });
        store.set(DARK_MODE_KEY, if self.dark_mode { "true" } else { "false" })
    }

    /// e.g. "80 kg" or "176.4 lb"
    pub fn format_weight(&self, kg: f64) -> String {
        let shown = self.measurement_system.display_weight(kg);
        let rounded = (shown * 10.0).round() / 10.0;
        format!("{} {}", rounded, self.measurement_system.weight_unit())
    }

    pub fn greeting(&self) -> String {
        if self.user_name.trim().is_empty() {
            "Welcome back".to_string()
        } else {
            format!("Welcome back, {}", self.user_name.trim())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_defaults_on_empty_store() {
        let settings = Settings::load(&MemoryStore::new());
        assert_eq!(settings, Settings::default());
        assert!(!settings.dark_mode);
        assert_eq!(settings.measurement_system, MeasurementSystem::Metric);
    }

    #[test]
    fn test_load_stored_strings() {
        let store = MemoryStore::new();
        store.set("darkMode", "true").unwrap();
        store.set("measurementSystem", "imperial").unwrap();
        store.set("userName", "Sam").unwrap();

        let settings = Settings::load(&store);
        assert!(settings.dark_mode);
        assert_eq!(settings.measurement_system, MeasurementSystem::Imperial);
        assert_eq!(settings.user_name, "Sam");
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let store = MemoryStore::new();
        store.set("darkMode", "yes").unwrap();
        store.set("measurementSystem", "furlongs").unwrap();

        let settings = Settings::load(&store);
        assert!(!settings.dark_mode);
        assert_eq!(settings.measurement_system, MeasurementSystem::Metric);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings {
            dark_mode: true,
            measurement_system: MeasurementSystem::Imperial,
            user_name: "Kim".to_string(),
        };
        settings.save(&store).unwrap();
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_toggle_dark_mode_persists() {
        let store = MemoryStore::new();
        let mut settings = Settings::load(&store);
        settings.toggle_dark_mode(&store).unwrap();
        assert!(settings.dark_mode);
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
        settings.toggle_dark_mode(&store).unwrap();
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_format_weight() {
        let mut settings = Settings::default();
        assert_eq!(settings.format_weight(80.0), "80 kg");
        settings.measurement_system = MeasurementSystem::Imperial;
        assert_eq!(settings.format_weight(80.0), "176.4 lb");
    }

    #[test]
    fn test_measurement_system_from_str() {
        assert_eq!("imperial".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("stone".parse::<MeasurementSystem>().is_err());
    }

    #[test]
    fn test_greeting() {
        let mut settings = Settings::default();
        assert_eq!(settings.greeting(), "Welcome back");
        settings.user_name = "Lee".to_string();
        assert_eq!(settings.greeting(), "Welcome back, Lee");
    }
}
