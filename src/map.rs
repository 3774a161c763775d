//! Map widget adapter
//!
//! The widget (tiles, pan/zoom, marker drawing) lives outside the crate.
//! `MapView` is the narrow surface the controller drives it through.

use serde::Serialize;

use crate::models::{Coordinate, WorkoutType};

/// ---------------------------------------------------------------------------
/// Widget Options
/// ---------------------------------------------------------------------------

pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
  "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Raster tile source shown under the markers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
  pub url_template: String,
  pub attribution: String,
}

impl Default for TileLayer {
  fn default() -> Self {
    Self {
      url_template: DEFAULT_TILE_URL.to_string(),
      attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
    }
  }
}

/// Popup attached to each workout marker. Popups stay open until the
/// marker is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupStyle {
  pub max_width: u32,
  pub min_width: u32,
  pub auto_close: bool,
  pub close_on_click: bool,
  pub class_name: String,
}

impl PopupStyle {
  pub fn for_type(kind: WorkoutType) -> Self {
    Self {
      max_width: 250,
      min_width: 100,
      auto_close: false,
      close_on_click: false,
      class_name: format!("{}-popup", kind),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanOptions {
  pub animate: bool,
  pub duration_secs: f64,
}

impl Default for PanOptions {
  fn default() -> Self {
    Self {
      animate: true,
      duration_secs: 1.0,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Markers
/// ---------------------------------------------------------------------------

/// Opaque handle to a placed marker, issued by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
  pub fn new(raw: u64) -> Self {
    Self(raw)
  }
}

impl std::fmt::Display for MarkerHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "marker#{}", self.0)
  }
}

/// Invoked with the clicked coordinate
pub type ClickHandler = Box<dyn Fn(Coordinate) + Send + Sync>;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MapError {
  #[error("Unknown marker: {0}")]
  UnknownMarker(MarkerHandle),

  #[error("Map widget unavailable: {0}")]
  Widget(String),
}

impl Serialize for MapError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Adapter Trait
/// ---------------------------------------------------------------------------

pub trait MapView: Send {
  /// Create (or re-create) the widget centered on `coord`
  fn center(&mut self, coord: Coordinate, zoom: u8, tiles: &TileLayer) -> Result<(), MapError>;

  /// Add a marker with an open popup styled for `kind`
  fn place_marker(
    &mut self,
    coord: Coordinate,
    kind: WorkoutType,
    popup_text: &str,
  ) -> Result<MarkerHandle, MapError>;

  fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), MapError>;

  /// Replace the click handler
  fn on_click(&mut self, handler: ClickHandler);

  fn pan_to(&mut self, coord: Coordinate, zoom: u8, options: PanOptions) -> Result<(), MapError>;
}
