use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::form::FormInput;

/// Epoch milliseconds of the moment the workout was logged
pub type WorkoutId = i64;

/// ---------------------------------------------------------------------------
/// Coordinate
/// ---------------------------------------------------------------------------

/// Latitude/longitude pair. Stored as a `[lat, lng]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinate {
  pub fn new(lat: f64, lng: f64) -> Self {
    Self { lat, lng }
  }
}

impl From<[f64; 2]> for Coordinate {
  fn from([lat, lng]: [f64; 2]) -> Self {
    Self { lat, lng }
  }
}

impl From<Coordinate> for [f64; 2] {
  fn from(coord: Coordinate) -> Self {
    [coord.lat, coord.lng]
  }
}

/// ---------------------------------------------------------------------------
/// Workout Type
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
  Running,
  Cycling,
}

impl WorkoutType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Running => "running",
      Self::Cycling => "cycling",
    }
  }

  /// Emoji used for popups and the first row of a list entry
  pub fn emoji(self) -> &'static str {
    match self {
      Self::Running => "🏃‍♂️",
      Self::Cycling => "🚴‍♀️",
    }
  }
}

impl std::fmt::Display for WorkoutType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for WorkoutType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "running" => Ok(Self::Running),
      "cycling" => Ok(Self::Cycling),
      _ => Err(format!("Unknown workout type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Workout
/// ---------------------------------------------------------------------------

/// Variant payload, discriminated by the `type` field when serialized.
/// Derived metrics are stored next to the raw input and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
  Running {
    /// steps/min
    #[serde(deserialize_with = "nan_from_null")]
    cadence: f64,
    /// min/km
    #[serde(deserialize_with = "nan_from_null")]
    pace: f64,
  },
  Cycling {
    /// meters
    #[serde(rename = "elevationGain", deserialize_with = "nan_from_null")]
    elevation_gain: f64,
    /// km/h
    #[serde(deserialize_with = "nan_from_null")]
    speed: f64,
  },
}

impl WorkoutKind {
  pub fn workout_type(&self) -> WorkoutType {
    match self {
      Self::Running { .. } => WorkoutType::Running,
      Self::Cycling { .. } => WorkoutType::Cycling,
    }
  }
}

/// A logged activity. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
  id: WorkoutId,
  coord: Coordinate,
  /// km
  #[serde(deserialize_with = "nan_from_null")]
  distance: f64,
  /// min
  #[serde(deserialize_with = "nan_from_null")]
  duration: f64,
  #[serde(rename = "content")]
  label: String,
  #[serde(flatten)]
  kind: WorkoutKind,
}

impl Workout {
  pub fn running(
    id: WorkoutId,
    coord: Coordinate,
    distance: f64,
    duration: f64,
    cadence: f64,
    created_at: DateTime<Utc>,
  ) -> Self {
    let kind = WorkoutKind::Running {
      cadence,
      pace: duration / distance,
    };
    Self::build(id, coord, distance, duration, kind, created_at)
  }

  pub fn cycling(
    id: WorkoutId,
    coord: Coordinate,
    distance: f64,
    duration: f64,
    elevation_gain: f64,
    created_at: DateTime<Utc>,
  ) -> Self {
    let kind = WorkoutKind::Cycling {
      elevation_gain,
      speed: distance / (duration / 60.0),
    };
    Self::build(id, coord, distance, duration, kind, created_at)
  }

  /// Build the variant selected in the form, coercing its numeric fields.
  pub fn from_form(
    id: WorkoutId,
    coord: Coordinate,
    input: &FormInput,
    created_at: DateTime<Utc>,
  ) -> Self {
    let (distance, duration, metric) = input.numbers();
    match input.kind {
      WorkoutType::Running => Self::running(id, coord, distance, duration, metric, created_at),
      WorkoutType::Cycling => Self::cycling(id, coord, distance, duration, metric, created_at),
    }
  }

  fn build(
    id: WorkoutId,
    coord: Coordinate,
    distance: f64,
    duration: f64,
    kind: WorkoutKind,
    created_at: DateTime<Utc>,
  ) -> Self {
    let label = display_label(kind.workout_type(), created_at);
    Self {
      id,
      coord,
      distance,
      duration,
      label,
      kind,
    }
  }

  pub fn id(&self) -> WorkoutId {
    self.id
  }

  pub fn coord(&self) -> Coordinate {
    self.coord
  }

  pub fn distance(&self) -> f64 {
    self.distance
  }

  pub fn duration(&self) -> f64 {
    self.duration
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn kind(&self) -> &WorkoutKind {
    &self.kind
  }

  pub fn workout_type(&self) -> WorkoutType {
    self.kind.workout_type()
  }

  pub fn pace(&self) -> Option<f64> {
    match self.kind {
      WorkoutKind::Running { pace, .. } => Some(pace),
      WorkoutKind::Cycling { .. } => None,
    }
  }

  pub fn speed(&self) -> Option<f64> {
    match self.kind {
      WorkoutKind::Cycling { speed, .. } => Some(speed),
      WorkoutKind::Running { .. } => None,
    }
  }

  /// Copy of this record under another id. Used when replayed data
  /// carries a duplicate id.
  pub(crate) fn with_id(&self, id: WorkoutId) -> Self {
    Self { id, ..self.clone() }
  }
}

/// "Running on 10/19, 14:03:22" in local time
pub fn display_label(kind: WorkoutType, created_at: DateTime<Utc>) -> String {
  let local = created_at.with_timezone(&Local);
  format!(
    "{} on {}",
    capitalize(kind.as_str()),
    local.format("%m/%d, %H:%M:%S")
  )
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => {
      let rest = chars.as_str().to_lowercase();
      first.to_uppercase().chain(rest.chars()).collect()
    }
    None => String::new(),
  }
}

/// Non-finite numbers are written as `null` by serde_json; read them back as NaN.
fn nan_from_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
