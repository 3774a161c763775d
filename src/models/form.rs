use serde::{Deserialize, Serialize};

use super::workout::WorkoutType;

/// Raw values of the workout form, as typed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
  #[serde(rename = "type")]
  pub kind: WorkoutType,
  #[serde(default)]
  pub distance: String,
  #[serde(default)]
  pub duration: String,
  /// Cadence for running, elevation gain for cycling
  #[serde(default)]
  pub metric: String,
}

impl FormInput {
  pub fn new(kind: WorkoutType, distance: &str, duration: &str, metric: &str) -> Self {
    Self {
      kind,
      distance: distance.to_string(),
      duration: duration.to_string(),
      metric: metric.to_string(),
    }
  }

  /// (distance, duration, metric) after numeric coercion
  pub fn numbers(&self) -> (f64, f64, f64) {
    (
      coerce_number(&self.distance),
      coerce_number(&self.duration),
      coerce_number(&self.metric),
    )
  }
}

/// Label and placeholder of the fourth form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricField {
  pub label: &'static str,
  pub placeholder: &'static str,
}

impl WorkoutType {
  pub fn metric_field(self) -> MetricField {
    match self {
      WorkoutType::Running => MetricField {
        label: "Cadence",
        placeholder: "step/min",
      },
      WorkoutType::Cycling => MetricField {
        label: "Elev Gain",
        placeholder: "meters",
      },
    }
  }
}

/// Numeric coercion of a form field.
///
/// Blank input is 0. Decimal literals (with optional sign, fraction and
/// exponent), `Infinity` and unsigned `0x`/`0o`/`0b` integers are accepted.
/// Anything else is NaN. No range checks are applied.
pub fn coerce_number(raw: &str) -> f64 {
  let s = raw.trim();
  if s.is_empty() {
    return 0.0;
  }

  match s {
    "Infinity" | "+Infinity" => return f64::INFINITY,
    "-Infinity" => return f64::NEG_INFINITY,
    _ => {}
  }

  if let Some(radix_value) = parse_prefixed_integer(s) {
    return radix_value;
  }

  // f64::from_str also takes "inf"/"nan"; only plain decimal syntax is allowed here
  let decimal_only = s
    .chars()
    .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
  if !decimal_only {
    return f64::NAN;
  }

  s.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_prefixed_integer(s: &str) -> Option<f64> {
  let (radix, digits) = match s.get(..2)? {
    "0x" | "0X" => (16, &s[2..]),
    "0o" | "0O" => (8, &s[2..]),
    "0b" | "0B" => (2, &s[2..]),
    _ => return None,
  };

  if digits.is_empty() {
    return Some(f64::NAN);
  }

  let mut value = 0.0f64;
  for c in digits.chars() {
    match c.to_digit(radix) {
      Some(d) => value = value * radix as f64 + d as f64,
      None => return Some(f64::NAN),
    }
  }
  Some(value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_coerce_plain_numbers() {
    assert_eq!(coerce_number("5"), 5.0);
    assert_eq!(coerce_number("  12.5 "), 12.5);
    assert_eq!(coerce_number("-3"), -3.0);
    assert_eq!(coerce_number("+7"), 7.0);
    assert_eq!(coerce_number(".5"), 0.5);
    assert_eq!(coerce_number("5."), 5.0);
    assert_eq!(coerce_number("1e3"), 1000.0);
  }

  #[test]
  fn test_coerce_blank_is_zero() {
    assert_eq!(coerce_number(""), 0.0);
    assert_eq!(coerce_number("   "), 0.0);
    assert_eq!(coerce_number("\t\n"), 0.0);
  }

  #[test]
  fn test_coerce_garbage_is_nan() {
    for raw in ["abc", "5km", "1,5", ".", "e5", "1e", "nan", "inf", "infinity", "--1", "0x"] {
      assert!(coerce_number(raw).is_nan(), "expected NaN for {:?}", raw);
    }
  }

  #[test]
  fn test_coerce_infinity_and_radix() {
    assert_eq!(coerce_number("Infinity"), f64::INFINITY);
    assert_eq!(coerce_number("-Infinity"), f64::NEG_INFINITY);
    assert_eq!(coerce_number("0x1F"), 31.0);
    assert_eq!(coerce_number("0b101"), 5.0);
    assert_eq!(coerce_number("0o17"), 15.0);
    assert!(coerce_number("0x1G").is_nan());
  }

  #[test]
  fn test_form_numbers() {
    let form = FormInput::new(WorkoutType::Running, "5", "25", "");
    assert_eq!(form.numbers(), (5.0, 25.0, 0.0));
  }

  #[test]
  fn test_form_deserializes_from_frontend_payload() {
    let form: FormInput =
      serde_json::from_str(r#"{"type":"cycling","distance":"20","duration":"60","metric":"300"}"#)
        .unwrap();
    assert_eq!(form.kind, WorkoutType::Cycling);
    assert_eq!(form.metric, "300");
  }

  #[test]
  fn test_metric_field_switches_with_type() {
    assert_eq!(WorkoutType::Running.metric_field().label, "Cadence");
    assert_eq!(WorkoutType::Running.metric_field().placeholder, "step/min");
    assert_eq!(WorkoutType::Cycling.metric_field().label, "Elev Gain");
    assert_eq!(WorkoutType::Cycling.metric_field().placeholder, "meters");
  }
}
