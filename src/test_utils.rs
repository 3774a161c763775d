//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Recording map and view adapters
//! - Mock data factories
//! - Helper assertions

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::controller::{AppEvent, Controller};
use crate::geolocation::GeolocationOptions;
use crate::map::{ClickHandler, MapError, MapView, MarkerHandle, PanOptions, TileLayer};
use crate::models::{Coordinate, FormInput, MetricField, Workout, WorkoutId, WorkoutType};
use crate::persistence::WorkoutRepository;
use crate::runtime::{self, EventReceiver, EventSender};
use crate::storage::{KeyValueStore, MemoryStore, StoreError};
use crate::view::{View, ViewError, WorkoutCard};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Store whose writes always fail; reads see an empty store
pub struct FailingStore;

impl KeyValueStore for FailingStore {
  async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
    Ok(None)
  }

  async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolClosed))
  }

  async fn remove(&self, _key: &str) -> Result<(), StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolClosed))
  }
}

/// ---------------------------------------------------------------------------
/// Recording Adapters
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
  pub coord: Coordinate,
  pub kind: WorkoutType,
  pub popup: String,
}

/// Map adapter that keeps its state in memory
#[derive(Default)]
pub struct RecordingMap {
  pub centered: Option<(Coordinate, u8)>,
  pub center_calls: usize,
  pub markers: BTreeMap<MarkerHandle, PlacedMarker>,
  pub pans: Vec<Coordinate>,
  click_handler: Option<ClickHandler>,
  next_marker: u64,
}

impl RecordingMap {
  /// Simulate a click on the widget
  pub fn click(&self, coord: Coordinate) {
    if let Some(handler) = &self.click_handler {
      handler(coord);
    }
  }
}

impl MapView for RecordingMap {
  fn center(&mut self, coord: Coordinate, zoom: u8, _tiles: &TileLayer) -> Result<(), MapError> {
    self.centered = Some((coord, zoom));
    self.center_calls += 1;
    Ok(())
  }

  fn place_marker(
    &mut self,
    coord: Coordinate,
    kind: WorkoutType,
    popup_text: &str,
  ) -> Result<MarkerHandle, MapError> {
    self.next_marker += 1;
    let handle = MarkerHandle::new(self.next_marker);
    self.markers.insert(
      handle,
      PlacedMarker {
        coord,
        kind,
        popup: popup_text.to_string(),
      },
    );
    Ok(handle)
  }

  fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), MapError> {
    self
      .markers
      .remove(&handle)
      .map(|_| ())
      .ok_or(MapError::UnknownMarker(handle))
  }

  fn on_click(&mut self, handler: ClickHandler) {
    self.click_handler = Some(handler);
  }

  fn pan_to(&mut self, coord: Coordinate, _zoom: u8, _options: PanOptions) -> Result<(), MapError> {
    self.pans.push(coord);
    Ok(())
  }
}

/// View adapter that records what it was asked to show
#[derive(Debug, Default)]
pub struct RecordingView {
  /// Top of the list first
  pub entries: Vec<WorkoutCard>,
  pub form_visible: bool,
  pub metric_field: Option<MetricField>,
  pub location_requests: usize,
  pub prompts: Vec<String>,
  pub clipboard: Vec<String>,
  /// When set, adding or removing list entries fails
  pub list_unavailable: bool,
}

impl RecordingView {
  fn check_list(&self) -> Result<(), ViewError> {
    if self.list_unavailable {
      Err(ViewError::Unavailable("list detached".to_string()))
    } else {
      Ok(())
    }
  }
}

impl View for RecordingView {
  fn prepend_entry(&mut self, card: &WorkoutCard) -> Result<(), ViewError> {
    self.check_list()?;
    self.entries.insert(0, card.clone());
    Ok(())
  }

  fn remove_entry(&mut self, id: WorkoutId) -> Result<(), ViewError> {
    self.check_list()?;
    self.entries.retain(|card| card.id != id);
    Ok(())
  }

  fn clear_entries(&mut self) -> Result<(), ViewError> {
    self.entries.clear();
    Ok(())
  }

  fn show_form(&mut self) -> Result<(), ViewError> {
    self.form_visible = true;
    Ok(())
  }

  fn hide_form(&mut self) -> Result<(), ViewError> {
    self.form_visible = false;
    Ok(())
  }

  fn set_metric_field(&mut self, field: MetricField) -> Result<(), ViewError> {
    self.metric_field = Some(field);
    Ok(())
  }

  fn request_location(&mut self, _options: &GeolocationOptions) -> Result<(), ViewError> {
    self.location_requests += 1;
    Ok(())
  }

  fn prompt_location_permission(&mut self, message: &str, _settings_path: &str) -> Result<(), ViewError> {
    self.prompts.push(message.to_string());
    Ok(())
  }

  fn copy_to_clipboard(&mut self, text: &str) -> Result<(), ViewError> {
    self.clipboard.push(text.to_string());
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Controller Fixtures
/// ---------------------------------------------------------------------------

pub type TestController = Controller<RecordingMap, RecordingView, MemoryStore>;

/// Controller over recording adapters with a fixed clock. The receiver
/// gets the events the controller forwards (map clicks).
pub fn test_controller<S: KeyValueStore>(
  store: S,
) -> (Controller<RecordingMap, RecordingView, S>, EventReceiver) {
  let (sender, receiver) = runtime::channel();
  (test_controller_with_sender(store, sender), receiver)
}

pub fn test_controller_with_sender<S: KeyValueStore>(
  store: S,
  sender: EventSender,
) -> Controller<RecordingMap, RecordingView, S> {
  Controller::new(
    RecordingMap::default(),
    RecordingView::default(),
    WorkoutRepository::new(store),
    AppConfig::default(),
    sender,
  )
  .with_clock(fixed_time)
}

/// Events sent so far, without waiting
pub fn drain_events(receiver: &mut EventReceiver) -> Vec<AppEvent> {
  let mut events = Vec::new();
  while let Ok(event) = receiver.try_recv() {
    events.push(event);
  }
  events
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn fixed_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 17, 6, 45, 0).unwrap()
}

pub fn mock_running(id: WorkoutId) -> Workout {
  Workout::running(id, Coordinate::new(51.5, -0.12), 5.0, 25.0, 178.0, fixed_time())
}

pub fn mock_cycling(id: WorkoutId) -> Workout {
  Workout::cycling(id, Coordinate::new(45.9, 6.87), 32.0, 80.0, 650.0, fixed_time())
}

pub fn running_form() -> FormInput {
  FormInput::new(WorkoutType::Running, "5", "25", "180")
}

pub fn cycling_form() -> FormInput {
  FormInput::new(WorkoutType::Cycling, "20", "60", "300")
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name = 'key_value_store'",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_recording_map_click_without_handler_is_noop() {
    let map = RecordingMap::default();
    map.click(Coordinate::new(0.0, 0.0));
  }

  #[test]
  fn test_recording_map_rejects_unknown_marker() {
    let mut map = RecordingMap::default();
    let handle = map
      .place_marker(Coordinate::new(1.0, 1.0), WorkoutType::Running, "x")
      .unwrap();

    assert!(map.remove_marker(handle).is_ok());
    assert!(matches!(map.remove_marker(handle), Err(MapError::UnknownMarker(_))));
  }

  #[tokio::test]
  async fn test_drain_events() {
    let (sender, mut receiver) = runtime::channel();
    sender.send(AppEvent::Start).unwrap();
    sender.send(AppEvent::DeleteAll).unwrap();

    assert_eq!(drain_events(&mut receiver), vec![AppEvent::Start, AppEvent::DeleteAll]);
    assert!(drain_events(&mut receiver).is_empty());
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let running = mock_running(1);
    assert_eq!(running.workout_type(), WorkoutType::Running);
    assert_eq!(running.pace(), Some(5.0));

    let cycling = mock_cycling(2);
    assert_eq!(cycling.speed(), Some(24.0));
  }
}
