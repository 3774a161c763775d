//! Current-position lookup
//!
//! The platform prompt and the lookup itself run in the webview. Only the
//! request options and the failure shape cross into Rust.

use serde::{Deserialize, Serialize};

/// Settings page the user is pointed at after denying location access
pub const DEFAULT_SETTINGS_PATH: &str = "chrome://settings/content/location";

/// Position request options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationOptions {
  pub enable_high_accuracy: bool,
  pub timeout_ms: u32,
  pub maximum_age_ms: u32,
}

impl Default for GeolocationOptions {
  fn default() -> Self {
    Self {
      enable_high_accuracy: true,
      timeout_ms: 5000,
      maximum_age_ms: 0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum LocationErrorCode {
  PermissionDenied,
  PositionUnavailable,
  Timeout,
  /// Lookup not supported or failed before a code was assigned
  Other(u16),
}

impl From<u16> for LocationErrorCode {
  fn from(code: u16) -> Self {
    match code {
      1 => Self::PermissionDenied,
      2 => Self::PositionUnavailable,
      3 => Self::Timeout,
      other => Self::Other(other),
    }
  }
}

impl From<LocationErrorCode> for u16 {
  fn from(code: LocationErrorCode) -> Self {
    match code {
      LocationErrorCode::PermissionDenied => 1,
      LocationErrorCode::PositionUnavailable => 2,
      LocationErrorCode::Timeout => 3,
      LocationErrorCode::Other(other) => other,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Location lookup failed ({code:?}): {message}")]
pub struct LocationError {
  pub code: LocationErrorCode,
  #[serde(default)]
  pub message: String,
}

impl LocationError {
  pub fn new(code: impl Into<LocationErrorCode>, message: &str) -> Self {
    Self {
      code: code.into(),
      message: message.to_string(),
    }
  }
}

/// Text shown when asking the user to grant location access
pub fn permission_prompt_text(settings_path: &str) -> String {
  format!(
    "Location access is needed to use the map.\nOpen the following page to allow it:\n{}\nPress OK to copy the address.",
    settings_path
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_code_from_browser_numbers() {
    assert_eq!(LocationErrorCode::from(1), LocationErrorCode::PermissionDenied);
    assert_eq!(LocationErrorCode::from(3), LocationErrorCode::Timeout);
    assert_eq!(LocationErrorCode::from(9), LocationErrorCode::Other(9));
  }

  #[test]
  fn test_error_deserializes_from_frontend_payload() {
    let err: LocationError =
      serde_json::from_str(r#"{"code":1,"message":"User denied Geolocation"}"#).unwrap();
    assert_eq!(err.code, LocationErrorCode::PermissionDenied);
    assert_eq!(err.message, "User denied Geolocation");

    let no_message: LocationError = serde_json::from_str(r#"{"code":2}"#).unwrap();
    assert_eq!(no_message.code, LocationErrorCode::PositionUnavailable);
    assert!(no_message.message.is_empty());
  }

  #[test]
  fn test_prompt_mentions_settings_path() {
    let text = permission_prompt_text(DEFAULT_SETTINGS_PATH);
    assert!(text.contains("chrome://settings/content/location"));
  }

  #[test]
  fn test_default_options() {
    let options = GeolocationOptions::default();
    assert!(options.enable_high_accuracy);
    assert_eq!(options.timeout_ms, 5000);
    assert_eq!(options.maximum_age_ms, 0);
  }
}
