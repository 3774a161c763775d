//! Tauri commands invoked by the webview
//!
//! Every command only enqueues an event; the event loop does the work and
//! answers through emitted events.

use serde::Serialize;
use std::sync::Arc;
use tauri::State;

use crate::controller::{AppEvent, ListTarget};
use crate::geolocation::LocationError;
use crate::models::{Coordinate, FormInput, WorkoutId, WorkoutType};
use crate::runtime::EventSender;
use crate::webview::ClickSlot;

/// Shared with every command
pub struct AppState {
  pub events: EventSender,
  pub clicks: ClickSlot,
}

impl AppState {
  fn send(&self, event: AppEvent) -> Result<(), ShellError> {
    self.events.send(event).map_err(|_| ShellError::EventLoopClosed)
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
  #[error("Event loop is not running")]
  EventLoopClosed,

  #[error("Map is not ready")]
  MapNotReady,
}

impl Serialize for ShellError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Startup
/// ---------------------------------------------------------------------------

/// Frontend listeners are attached; start the location lookup
#[tauri::command]
pub async fn app_ready(state: State<'_, Arc<AppState>>) -> Result<(), ShellError> {
  state.send(AppEvent::Start)
}

#[tauri::command]
pub async fn location_resolved(
  state: State<'_, Arc<AppState>>,
  lat: f64,
  lng: f64,
) -> Result<(), ShellError> {
  state.send(AppEvent::LocationResolved(Coordinate::new(lat, lng)))
}

#[tauri::command]
pub async fn location_failed(
  state: State<'_, Arc<AppState>>,
  error: LocationError,
) -> Result<(), ShellError> {
  state.send(AppEvent::LocationFailed(error))
}

#[tauri::command]
pub async fn permission_prompt_answered(
  state: State<'_, Arc<AppState>>,
  accepted: bool,
) -> Result<(), ShellError> {
  state.send(AppEvent::PermissionPromptAnswered { accepted })
}

/// ---------------------------------------------------------------------------
/// Map
/// ---------------------------------------------------------------------------

/// Forwarded to whatever handler the map adapter installed
#[tauri::command]
pub async fn map_clicked(
  state: State<'_, Arc<AppState>>,
  lat: f64,
  lng: f64,
) -> Result<(), ShellError> {
  if state.clicks.fire(Coordinate::new(lat, lng)) {
    Ok(())
  } else {
    Err(ShellError::MapNotReady)
  }
}

/// ---------------------------------------------------------------------------
/// Form & List
/// ---------------------------------------------------------------------------

#[tauri::command]
pub async fn activity_type_changed(
  state: State<'_, Arc<AppState>>,
  kind: WorkoutType,
) -> Result<(), ShellError> {
  state.send(AppEvent::ActivityTypeChanged(kind))
}

#[tauri::command]
pub async fn submit_workout(
  state: State<'_, Arc<AppState>>,
  form: FormInput,
) -> Result<(), ShellError> {
  state.send(AppEvent::FormSubmitted(form))
}

#[tauri::command]
pub async fn workout_list_clicked(
  state: State<'_, Arc<AppState>>,
  id: WorkoutId,
  target: ListTarget,
) -> Result<(), ShellError> {
  state.send(AppEvent::ListClicked { id, target })
}

#[tauri::command]
pub async fn key_up(state: State<'_, Arc<AppState>>, key: String) -> Result<(), ShellError> {
  state.send(AppEvent::KeyUp(key))
}

#[tauri::command]
pub async fn delete_all_workouts(state: State<'_, Arc<AppState>>) -> Result<(), ShellError> {
  state.send(AppEvent::DeleteAll)
}

#[tauri::command]
pub async fn reset_app(state: State<'_, Arc<AppState>>) -> Result<(), ShellError> {
  state.send(AppEvent::Reset)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
