//! Exercise definitions - built-in catalog plus user additions
//!
//! Built-in and custom exercises are kept apart. The list shown to the
//! user is always `merge(builtin, custom)`, computed on demand.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::db::records::CARDIO;

/// Built-in exercises per body part, in display order
pub const BUILTIN_EXERCISES: &[(&str, &[&str])] = &[
    ("Chest", &["Bench Press", "Incline Press", "Chest Fly", "Push-ups", "Decline Press"]),
    ("Back", &["Pull-ups", "Deadlift", "Bent Over Row", "Lat Pulldown", "T-Bar Row"]),
    ("Legs", &["Squat", "Leg Press", "Lunges", "Leg Extension", "Hamstring Curl"]),
    ("Shoulders", &["Shoulder Press", "Lateral Raise", "Front Raise", "Reverse Fly", "Shrugs"]),
    (CARDIO, &["Running", "Cycling", "Jump Rope", "Stair Climber", "Elliptical"]),
    ("Abs", &["Crunches", "Plank", "Russian Twist", "Leg Raises", "Ab Rollout"]),
    ("Biceps", &["Bicep Curl", "Hammer Curl", "Preacher Curl", "Concentration Curl", "Cable Curl"]),
    ("Triceps", &["Tricep Extension", "Skull Crushers", "Tricep Pushdown", "Dips", "Close-Grip Bench Press"]),
];

/// All built-in body parts for iteration
pub fn builtin_body_parts() -> impl Iterator<Item = &'static str> {
    BUILTIN_EXERCISES.iter().map(|(part, _)| *part)
}

/// Body parts tracked by weight (everything but cardio)
pub fn strength_body_parts() -> Vec<&'static str> {
    builtin_body_parts().filter(|part| *part != CARDIO).collect()
}

pub fn builtin_catalog() -> ExerciseCatalog {
    let mut catalog = ExerciseCatalog::new();
    for (part, names) in BUILTIN_EXERCISES {
        for name in *names {
            catalog.push(part, name);
        }
    }
    catalog
}

/// First listed built-in exercise, the selector's default
pub fn default_exercise(body_part: &str) -> Option<&'static str> {
    BUILTIN_EXERCISES
        .iter()
        .find(|(part, _)| *part == body_part)
        .and_then(|(_, names)| names.first().copied())
}

/// Ordered mapping body part -> duplicate-free exercise names
///
/// Serialized as a JSON object. Document order is kept when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseCatalog {
    groups: Vec<(String, Vec<String>)>,
}

impl ExerciseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, body_part: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(part, _)| part == body_part)
            .map(|(_, names)| names.as_slice())
    }

    pub fn contains(&self, body_part: &str, name: &str) -> bool {
        self.get(body_part).is_some_and(|names| names.iter().any(|n| n == name))
    }

    pub fn body_parts(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(part, _)| part.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(part, names)| (part.as_str(), names.as_slice()))
    }

    /// Number of body parts
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Append `name` under `body_part` unless already there.
    /// Returns whether anything changed.
    fn push(&mut self, body_part: &str, name: &str) -> bool {
        match self.groups.iter_mut().find(|(part, _)| part == body_part) {
            Some((_, names)) => {
                if names.iter().any(|n| n == name) {
                    return false;
                }
                names.push(name.to_string());
            }
            None => self.groups.push((body_part.to_string(), vec![name.to_string()])),
        }
        true
    }

    /// Catalog with `name` appended to `body_part`'s list
    ///
    /// Unchanged when the name is already listed (exact, case-sensitive)
    /// or blank.
    pub fn add_custom_exercise(mut self, body_part: &str, name: &str) -> Self {
        if !name.trim().is_empty() && !body_part.trim().is_empty() {
            self.push(body_part, name);
        }
        self
    }
}

/// Built-in names first, then custom names not already listed
///
/// Body parts keep `builtin` order; parts only in `custom` follow in
/// their own order. Idempotent: `merge(&merge(a, b), b) == merge(a, b)`.
pub fn merge(builtin: &ExerciseCatalog, custom: &ExerciseCatalog) -> ExerciseCatalog {
    let mut merged = builtin.clone();
    for (part, names) in custom.iter() {
        for name in names {
            merged.push(part, name);
        }
    }
    merged
}

impl Serialize for ExerciseCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (part, names) in &self.groups {
            map.serialize_entry(part, names)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExerciseCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = ExerciseCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of body part to exercise names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut catalog = ExerciseCatalog::new();
                while let Some((part, names)) = access.next_entry::<String, Vec<String>>()? {
                    for name in &names {
                        catalog.push(&part, name);
                    }
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
