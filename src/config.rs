use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::geolocation::{GeolocationOptions, DEFAULT_SETTINGS_PATH};
use crate::map::{PanOptions, TileLayer};
use crate::persistence::DEFAULT_STORAGE_KEY;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const ENV_STORAGE_KEY: &str = "WORKOUT_MAP_STORAGE_KEY";
const ENV_ZOOM: &str = "WORKOUT_MAP_ZOOM";
const ENV_TILE_URL: &str = "WORKOUT_MAP_TILE_URL";
const ENV_TILE_ATTRIBUTION: &str = "WORKOUT_MAP_TILE_ATTRIBUTION";
const ENV_LOCATION_TIMEOUT_MS: &str = "WORKOUT_MAP_LOCATION_TIMEOUT_MS";
const ENV_HIGH_ACCURACY: &str = "WORKOUT_MAP_HIGH_ACCURACY";
const ENV_SETTINGS_PATH: &str = "WORKOUT_MAP_SETTINGS_PATH";
const ENV_DB_PATH: &str = "WORKOUT_MAP_DB_PATH";

pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value:?}")]
  Invalid { name: String, value: String },
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub storage_key: String,
  pub zoom: u8,
  pub tiles: TileLayer,
  pub geolocation: GeolocationOptions,
  pub pan: PanOptions,
  pub settings_path: String,
  /// Overrides the app-data location of the SQLite file
  pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      storage_key: DEFAULT_STORAGE_KEY.to_string(),
      zoom: DEFAULT_ZOOM,
      tiles: TileLayer::default(),
      geolocation: GeolocationOptions::default(),
      pan: PanOptions::default(),
      settings_path: DEFAULT_SETTINGS_PATH.to_string(),
      db_path: None,
    }
  }
}

impl AppConfig {
  /// Defaults overridden by any `WORKOUT_MAP_*` variables that are set
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let geolocation = GeolocationOptions {
      enable_high_accuracy: parse_bool(ENV_HIGH_ACCURACY)?
        .unwrap_or(defaults.geolocation.enable_high_accuracy),
      timeout_ms: parse_var(ENV_LOCATION_TIMEOUT_MS)?.unwrap_or(defaults.geolocation.timeout_ms),
      ..defaults.geolocation
    };

    let tiles = TileLayer {
      url_template: string_var(ENV_TILE_URL).unwrap_or(defaults.tiles.url_template),
      attribution: string_var(ENV_TILE_ATTRIBUTION).unwrap_or(defaults.tiles.attribution),
    };

    Ok(Self {
      storage_key: string_var(ENV_STORAGE_KEY).unwrap_or(defaults.storage_key),
      zoom: parse_var(ENV_ZOOM)?.unwrap_or(defaults.zoom),
      tiles,
      geolocation,
      pan: defaults.pan,
      settings_path: string_var(ENV_SETTINGS_PATH).unwrap_or(defaults.settings_path),
      db_path: string_var(ENV_DB_PATH).map(PathBuf::from),
    })
  }
}

/// Set and non-blank
fn string_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
  match string_var(name) {
    Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError::Invalid {
      name: name.to_string(),
      value: raw,
    }),
    None => Ok(None),
  }
}

fn parse_bool(name: &str) -> Result<Option<bool>, ConfigError> {
  match string_var(name) {
    Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" | "on" => Ok(Some(true)),
      "0" | "false" | "no" | "off" => Ok(Some(false)),
      _ => Err(ConfigError::Invalid {
        name: name.to_string(),
        value: raw,
      }),
    },
    None => Ok(None),
  }
}
