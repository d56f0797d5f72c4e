//! Ledger records as stored under the `workouts` and `weightHistory` keys

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Body part whose exercises are timed instead of weighed
pub const CARDIO: &str = "Cardio";

/// What a measurement counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Weight,
    Duration,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Weight => "weight",
            MetricKind::Duration => "duration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weight" => Some(MetricKind::Weight),
            "duration" => Some(MetricKind::Duration),
            _ => None,
        }
    }

    /// Cardio is logged in minutes, everything else in kilograms
    pub fn for_body_part(body_part: &str) -> Self {
        if body_part == CARDIO {
            MetricKind::Duration
        } else {
            MetricKind::Weight
        }
    }
}

/// Measured value of a workout set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Measurement {
    #[default]
    Unmeasured,
    /// Kilograms
    Weight(f64),
    /// Minutes
    Duration(f64),
}

impl Measurement {
    pub fn new(kind: MetricKind, value: f64) -> Self {
        match kind {
            MetricKind::Weight => Measurement::Weight(value),
            MetricKind::Duration => Measurement::Duration(value),
        }
    }

    pub fn kind(&self) -> Option<MetricKind> {
        match self {
            Measurement::Unmeasured => None,
            Measurement::Weight(_) => Some(MetricKind::Weight),
            Measurement::Duration(_) => Some(MetricKind::Duration),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Measurement::Unmeasured => None,
            Measurement::Weight(v) | Measurement::Duration(v) => Some(*v),
        }
    }

    /// Value if this is a measurement of `kind`
    pub fn value_of(&self, kind: MetricKind) -> Option<f64> {
        if self.kind() == Some(kind) { self.value() } else { None }
    }
}

/// Parse a numeric-as-string field. Only finite numbers count.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One logged workout set
///
/// `value` and `valueType` are kept exactly as they were stored and
/// written back unchanged; `measurement` is what they parse to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWorkoutEntry", into = "RawWorkoutEntry")]
pub struct WorkoutEntry {
    pub id: String,
    /// `YYYY-MM-DD`, the grouping key
    pub date: String,
    pub body_part: String,
    pub exercise_name: String,
    /// Time of day for display only
    pub timestamp: String,
    measurement: Measurement,
    value: Option<Value>,
    value_type: Option<Value>,
}

impl WorkoutEntry {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        body_part: impl Into<String>,
        exercise_name: impl Into<String>,
        timestamp: impl Into<String>,
        measurement: Measurement,
    ) -> Self {
        let (value, value_type) = match (measurement.value(), measurement.kind()) {
            (Some(v), Some(kind)) => (
                Some(Value::String(v.to_string())),
                Some(Value::String(kind.as_str().to_string())),
            ),
            _ => (None, None),
        };

        Self {
            id: id.into(),
            date: date.into(),
            body_part: body_part.into(),
            exercise_name: exercise_name.into(),
            timestamp: timestamp.into(),
            measurement,
            value,
            value_type,
        }
    }

    pub fn measurement(&self) -> Measurement {
        self.measurement
    }

    /// Stored `value` as text, whether or not it parses
    pub fn stored_value(&self) -> Option<String> {
        self.value.as_ref().map(value_text)
    }

    /// Stored `valueType` as text
    pub fn stored_value_type(&self) -> Option<String> {
        self.value_type.as_ref().map(value_text)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strings and plain JSON numbers both count as amounts
fn stored_amount(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_amount(s),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// On-disk shape: `value` and `valueType` are optional and usually strings
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkoutEntry {
    id: String,
    date: String,
    body_part: String,
    exercise_name: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_type: Option<Value>,
}

impl From<RawWorkoutEntry> for WorkoutEntry {
    fn from(raw: RawWorkoutEntry) -> Self {
        let value = raw.value.filter(|v| !v.is_null());
        let value_type = raw.value_type.filter(|t| !t.is_null());

        let measurement = match (&value, &value_type) {
            (None, _) | (_, None) => Measurement::Unmeasured,
            (Some(Value::String(v)), Some(_)) if v.trim().is_empty() => Measurement::Unmeasured,
            (Some(v), Some(t)) => match (t.as_str().and_then(MetricKind::parse), stored_amount(v)) {
                (Some(kind), Some(amount)) => Measurement::new(kind, amount),
                (None, _) => {
                    warn!("Workout {}: unknown value type {}, ignoring value", raw.id, t);
                    Measurement::Unmeasured
                }
                (_, None) => {
                    warn!("Workout {}: value {} is not a number, ignoring it", raw.id, v);
                    Measurement::Unmeasured
                }
            },
        };

        Self {
            id: raw.id,
            date: raw.date,
            body_part: raw.body_part,
            exercise_name: raw.exercise_name,
            timestamp: raw.timestamp,
            measurement,
            value,
            value_type,
        }
    }
}

impl From<WorkoutEntry> for RawWorkoutEntry {
    fn from(entry: WorkoutEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            body_part: entry.body_part,
            exercise_name: entry.exercise_name,
            timestamp: entry.timestamp,
            value: entry.value,
            value_type: entry.value_type,
        }
    }
}

/// Accepts `"75.5"` or `75.5`, always kept as text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected a weight, got {}", other))),
    }
}

/// One body-weight reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Kilograms, numeric-as-string
    #[serde(deserialize_with = "string_or_number")]
    pub weight: String,
    pub date: String,
    #[serde(default)]
    pub timestamp: String,
}

impl WeightEntry {
    pub fn kilograms(&self) -> Option<f64> {
        parse_amount(&self.weight)
    }
}
