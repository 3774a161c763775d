//! Form and list rendering
//!
//! `View` is everything the controller does to the page apart from the
//! map: the workout list, the form and the location prompt. List entries
//! are built from stored fields only.

use serde::Serialize;

use crate::geolocation::GeolocationOptions;
use crate::models::{MetricField, Workout, WorkoutId, WorkoutKind, WorkoutType};

/// ---------------------------------------------------------------------------
/// List Entries
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
  pub icon: &'static str,
  pub value: String,
  pub unit: &'static str,
}

/// One rendered list entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCard {
  pub id: WorkoutId,
  #[serde(rename = "type")]
  pub kind: WorkoutType,
  pub title: String,
  pub details: Vec<DetailRow>,
}

impl WorkoutCard {
  pub fn from_workout(workout: &Workout) -> Self {
    let kind = workout.workout_type();

    // Derived metric and variant metric fall back to 0 when missing or NaN
    let (rate, rate_unit, metric_icon, metric, metric_unit) = match *workout.kind() {
      WorkoutKind::Running { cadence, pace } => (pace, "min/km", "🦶🏼", cadence, "spm"),
      WorkoutKind::Cycling { elevation_gain, speed } => (speed, "km/h", "⛰", elevation_gain, "m"),
    };

    Self {
      id: workout.id(),
      kind,
      title: workout.label().to_string(),
      details: vec![
        DetailRow {
          icon: kind.emoji(),
          value: format_value(workout.distance()),
          unit: "km",
        },
        DetailRow {
          icon: "⏱",
          value: format_value(workout.duration()),
          unit: "min",
        },
        DetailRow {
          icon: "⚡️",
          value: format_value(zero_if_nan(rate)),
          unit: rate_unit,
        },
        DetailRow {
          icon: metric_icon,
          value: format_value(zero_if_nan(metric)),
          unit: metric_unit,
        },
      ],
    }
  }
}

/// Marker popup text: emoji then label
pub fn popup_text(workout: &Workout) -> String {
  format!("{} {}", workout.workout_type().emoji(), workout.label())
}

/// Round to 2 decimals and drop trailing zeros ("5", "5.5", "5.12")
pub fn format_value(value: f64) -> String {
  if value.is_nan() {
    return "NaN".to_string();
  }
  if value.is_infinite() {
    return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
  }

  let rounded = (value * 100.0).round() / 100.0;
  if rounded == 0.0 {
    // no "-0"
    return "0".to_string();
  }
  format!("{}", rounded)
}

fn zero_if_nan(value: f64) -> f64 {
  if value.is_nan() {
    0.0
  } else {
    value
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
  #[error("View unavailable: {0}")]
  Unavailable(String),
}

impl Serialize for ViewError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// View Trait
/// ---------------------------------------------------------------------------

pub trait View: Send {
  /// Insert at the top of the list
  fn prepend_entry(&mut self, card: &WorkoutCard) -> Result<(), ViewError>;

  fn remove_entry(&mut self, id: WorkoutId) -> Result<(), ViewError>;

  fn clear_entries(&mut self) -> Result<(), ViewError>;

  /// Show the form and focus the distance field
  fn show_form(&mut self) -> Result<(), ViewError>;

  /// Hide the form and clear its numeric inputs
  fn hide_form(&mut self) -> Result<(), ViewError>;

  fn set_metric_field(&mut self, field: MetricField) -> Result<(), ViewError>;

  /// Ask the platform for the current position. The answer comes back as
  /// a location event.
  fn request_location(&mut self, options: &GeolocationOptions) -> Result<(), ViewError>;

  /// Ask the user to grant location access. The answer comes back as a
  /// prompt-answered event.
  fn prompt_location_permission(&mut self, message: &str, settings_path: &str) -> Result<(), ViewError>;

  fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ViewError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Coordinate;
  use crate::test_utils::*;

  #[test]
  fn test_format_value_trims_zeros() {
    assert_eq!(format_value(5.0), "5");
    assert_eq!(format_value(5.5), "5.5");
    assert_eq!(format_value(5.126), "5.13");
    assert_eq!(format_value(4.999), "5");
    assert_eq!(format_value(-0.001), "0");
  }

  #[test]
  fn test_format_value_non_finite() {
    assert_eq!(format_value(f64::NAN), "NaN");
    assert_eq!(format_value(f64::INFINITY), "Infinity");
    assert_eq!(format_value(f64::NEG_INFINITY), "-Infinity");
  }

  #[test]
  fn test_running_card_rows() {
    let workout = Workout::running(42, Coordinate::new(1.0, 2.0), 5.0, 25.0, 180.0, fixed_time());
    let card = WorkoutCard::from_workout(&workout);

    assert_eq!(card.id, 42);
    assert_eq!(card.kind, WorkoutType::Running);
    assert!(card.title.starts_with("Running on "));

    let values: Vec<(&str, &str)> = card.details.iter().map(|d| (d.value.as_str(), d.unit)).collect();
    assert_eq!(
      values,
      vec![("5", "km"), ("25", "min"), ("5", "min/km"), ("180", "spm")]
    );
  }

  #[test]
  fn test_cycling_card_rows() {
    let workout = Workout::cycling(7, Coordinate::new(1.0, 2.0), 27.0, 70.0, 312.5, fixed_time());
    let card = WorkoutCard::from_workout(&workout);

    assert_eq!(card.details[0].icon, "🚴‍♀️");
    assert_eq!(card.details[2].value, "23.14");
    assert_eq!(card.details[2].unit, "km/h");
    assert_eq!(card.details[3].icon, "⛰");
    assert_eq!(card.details[3].value, "312.5");
  }

  #[test]
  fn test_card_with_nan_input() {
    let workout = Workout::running(1, Coordinate::new(0.0, 0.0), f64::NAN, 25.0, f64::NAN, fixed_time());
    let card = WorkoutCard::from_workout(&workout);

    assert_eq!(card.details[0].value, "NaN");
    // pace and cadence fall back to 0
    assert_eq!(card.details[2].value, "0");
    assert_eq!(card.details[3].value, "0");
  }

  #[test]
  fn test_popup_text() {
    let workout = mock_cycling(3);
    let text = popup_text(&workout);
    assert!(text.starts_with("🚴‍♀️ Cycling on "));
  }
}
