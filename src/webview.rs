//! Webview-backed adapters
//!
//! The Leaflet map and the form/list markup live in the webview (`ui/`).
//! These adapters drive them by emitting events; the frontend applies
//! each payload as-is.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tauri::{AppHandle, Emitter, Manager, Runtime};

use crate::db::DB_FILE_NAME;
use crate::geolocation::GeolocationOptions;
use crate::map::{ClickHandler, MapError, MapView, MarkerHandle, PanOptions, PopupStyle, TileLayer};
use crate::models::{Coordinate, MetricField, WorkoutId, WorkoutType};
use crate::view::{View, ViewError, WorkoutCard};

/// ---------------------------------------------------------------------------
/// Event Names
/// ---------------------------------------------------------------------------

pub const EVENT_MAP_CENTER: &str = "map://center";
pub const EVENT_MAP_MARKER_ADD: &str = "map://marker-add";
pub const EVENT_MAP_MARKER_REMOVE: &str = "map://marker-remove";
pub const EVENT_MAP_PAN: &str = "map://pan";
pub const EVENT_LIST_PREPEND: &str = "list://prepend";
pub const EVENT_LIST_REMOVE: &str = "list://remove";
pub const EVENT_LIST_CLEAR: &str = "list://clear";
pub const EVENT_FORM_SHOW: &str = "form://show";
pub const EVENT_FORM_HIDE: &str = "form://hide";
pub const EVENT_FORM_METRIC: &str = "form://metric-field";
pub const EVENT_GEO_REQUEST: &str = "geo://request";
pub const EVENT_GEO_PROMPT: &str = "geo://prompt";
pub const EVENT_CLIPBOARD_WRITE: &str = "clipboard://write";

/// ---------------------------------------------------------------------------
/// Payloads
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CenterPayload<'a> {
  lat: f64,
  lng: f64,
  zoom: u8,
  tiles: &'a TileLayer,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkerPayload<'a> {
  handle: MarkerHandle,
  lat: f64,
  lng: f64,
  popup: &'a str,
  popup_style: PopupStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PanPayload {
  lat: f64,
  lng: f64,
  zoom: u8,
  #[serde(flatten)]
  options: PanOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptPayload<'a> {
  message: &'a str,
  settings_path: &'a str,
}

/// ---------------------------------------------------------------------------
/// Click Slot
/// ---------------------------------------------------------------------------

/// Shared between `WebviewMap` (which installs the handler) and the
/// `map_clicked` command (which fires it)
#[derive(Clone, Default)]
pub struct ClickSlot(Arc<Mutex<Option<ClickHandler>>>);

impl ClickSlot {
  pub fn set(&self, handler: ClickHandler) {
    *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
  }

  /// Returns false when no handler is installed yet
  pub fn fire(&self, coord: Coordinate) -> bool {
    let slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
      Some(handler) => {
        handler(coord);
        true
      }
      None => false,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Map Adapter
/// ---------------------------------------------------------------------------

pub struct WebviewMap<R: Runtime> {
  app: AppHandle<R>,
  clicks: ClickSlot,
  next_marker: u64,
}

impl<R: Runtime> WebviewMap<R> {
  pub fn new(app: AppHandle<R>, clicks: ClickSlot) -> Self {
    Self {
      app,
      clicks,
      next_marker: 0,
    }
  }

  fn emit<P: Serialize + Clone>(&self, event: &str, payload: P) -> Result<(), MapError> {
    self
      .app
      .emit(event, payload)
      .map_err(|e| MapError::Widget(e.to_string()))
  }
}

impl<R: Runtime> MapView for WebviewMap<R> {
  fn center(&mut self, coord: Coordinate, zoom: u8, tiles: &TileLayer) -> Result<(), MapError> {
    self.emit(
      EVENT_MAP_CENTER,
      CenterPayload {
        lat: coord.lat,
        lng: coord.lng,
        zoom,
        tiles,
      },
    )
  }

  fn place_marker(
    &mut self,
    coord: Coordinate,
    kind: WorkoutType,
    popup_text: &str,
  ) -> Result<MarkerHandle, MapError> {
    self.next_marker += 1;
    let handle = MarkerHandle::new(self.next_marker);
    self.emit(
      EVENT_MAP_MARKER_ADD,
      MarkerPayload {
        handle,
        lat: coord.lat,
        lng: coord.lng,
        popup: popup_text,
        popup_style: PopupStyle::for_type(kind),
      },
    )?;
    Ok(handle)
  }

  fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), MapError> {
    self.emit(EVENT_MAP_MARKER_REMOVE, handle)
  }

  fn on_click(&mut self, handler: ClickHandler) {
    self.clicks.set(handler);
  }

  fn pan_to(&mut self, coord: Coordinate, zoom: u8, options: PanOptions) -> Result<(), MapError> {
    self.emit(
      EVENT_MAP_PAN,
      PanPayload {
        lat: coord.lat,
        lng: coord.lng,
        zoom,
        options,
      },
    )
  }
}

/// ---------------------------------------------------------------------------
/// View Adapter
/// ---------------------------------------------------------------------------

pub struct WebviewView<R: Runtime> {
  app: AppHandle<R>,
}

impl<R: Runtime> WebviewView<R> {
  pub fn new(app: AppHandle<R>) -> Self {
    Self { app }
  }

  fn emit<P: Serialize + Clone>(&self, event: &str, payload: P) -> Result<(), ViewError> {
    self
      .app
      .emit(event, payload)
      .map_err(|e| ViewError::Unavailable(e.to_string()))
  }
}

impl<R: Runtime> View for WebviewView<R> {
  fn prepend_entry(&mut self, card: &WorkoutCard) -> Result<(), ViewError> {
    self.emit(EVENT_LIST_PREPEND, card)
  }

  fn remove_entry(&mut self, id: WorkoutId) -> Result<(), ViewError> {
    self.emit(EVENT_LIST_REMOVE, id)
  }

  fn clear_entries(&mut self) -> Result<(), ViewError> {
    self.emit(EVENT_LIST_CLEAR, ())
  }

  fn show_form(&mut self) -> Result<(), ViewError> {
    self.emit(EVENT_FORM_SHOW, ())
  }

  fn hide_form(&mut self) -> Result<(), ViewError> {
    self.emit(EVENT_FORM_HIDE, ())
  }

  fn set_metric_field(&mut self, field: MetricField) -> Result<(), ViewError> {
    self.emit(EVENT_FORM_METRIC, field)
  }

  fn request_location(&mut self, options: &GeolocationOptions) -> Result<(), ViewError> {
    self.emit(EVENT_GEO_REQUEST, options)
  }

  fn prompt_location_permission(&mut self, message: &str, settings_path: &str) -> Result<(), ViewError> {
    self.emit(
      EVENT_GEO_PROMPT,
      PromptPayload {
        message,
        settings_path,
      },
    )
  }

  fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ViewError> {
    self.emit(EVENT_CLIPBOARD_WRITE, text)
  }
}

/// Get the path to the database file
/// Stored in the platform app data dir, e.g. ~/.local/share/<identifier>/workout-map.db
pub fn default_db_path<R: Runtime>(app: &AppHandle<R>) -> Result<PathBuf, tauri::Error> {
  let data_dir = app.path().app_data_dir()?;
  Ok(data_dir.join(DB_FILE_NAME))
}
