//! Application controller
//!
//! Owns the in-memory workout collection and the form state, reacts to
//! one `AppEvent` at a time, and keeps the map, the list and the store in
//! step with every mutation.
//!
//! Lifecycle:
//! - `Start` asks the platform for a position
//! - a resolved position centers the map and replays stored workouts
//! - a denied/failed lookup prompts the user; declining the prompt retries
//! - map clicks open the form, submits create workouts, list clicks pan or delete

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::geolocation::{permission_prompt_text, LocationError};
use crate::map::{MapError, MapView, MarkerHandle};
use crate::models::{Coordinate, FormInput, Workout, WorkoutId, WorkoutType};
use crate::persistence::{PersistenceError, WorkoutRepository};
use crate::runtime::EventSender;
use crate::storage::KeyValueStore;
use crate::view::{popup_text, View, ViewError, WorkoutCard};

/// ---------------------------------------------------------------------------
/// Events
/// ---------------------------------------------------------------------------

/// Which part of a list entry was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListTarget {
  Body,
  DeleteControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
  Start,
  LocationResolved(Coordinate),
  LocationFailed(LocationError),
  PermissionPromptAnswered { accepted: bool },
  MapClicked(Coordinate),
  ActivityTypeChanged(WorkoutType),
  FormSubmitted(FormInput),
  ListClicked { id: WorkoutId, target: ListTarget },
  KeyUp(String),
  DeleteAll,
  Reset,
  /// Stops the event loop
  Shutdown,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
  #[error("Form submitted without a selected map location")]
  FormNotOpen,

  #[error("No workout with id {0}")]
  UnknownWorkout(WorkoutId),

  #[error(transparent)]
  Persistence(#[from] PersistenceError),

  #[error(transparent)]
  Map(#[from] MapError),

  #[error(transparent)]
  View(#[from] ViewError),
}

impl Serialize for ControllerError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// State
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormState {
  Hidden,
  /// Open for the map location that was clicked
  Visible { coord: Coordinate },
}

/// A workout and the marker showing it
#[derive(Debug, Clone)]
struct Entry {
  workout: Workout,
  marker: Option<MarkerHandle>,
}

pub type Clock = fn() -> DateTime<Utc>;

pub struct Controller<M, V, S> {
  map: M,
  view: V,
  repository: WorkoutRepository<S>,
  config: AppConfig,
  events: EventSender,
  clock: Clock,
  form: FormState,
  /// Insertion order: replayed workouts first, in stored order
  entries: Vec<Entry>,
  map_ready: bool,
}

impl<M, V, S> Controller<M, V, S>
where
  M: MapView,
  V: View,
  S: KeyValueStore,
{
  /// `events` is where map clicks are forwarded once the map is up
  pub fn new(
    map: M,
    view: V,
    repository: WorkoutRepository<S>,
    config: AppConfig,
    events: EventSender,
  ) -> Self {
    Self {
      map,
      view,
      repository,
      config,
      events,
      clock: Utc::now,
      form: FormState::Hidden,
      entries: Vec::new(),
      map_ready: false,
    }
  }

  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }

  pub fn map(&self) -> &M {
    &self.map
  }

  pub fn view(&self) -> &V {
    &self.view
  }

  pub fn repository(&self) -> &WorkoutRepository<S> {
    &self.repository
  }

  pub fn form_state(&self) -> FormState {
    self.form
  }

  pub fn is_map_ready(&self) -> bool {
    self.map_ready
  }

  /// Workouts in insertion order
  pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
    self.entries.iter().map(|entry| &entry.workout)
  }

  pub fn workout_count(&self) -> usize {
    self.entries.len()
  }

  pub fn marker_for(&self, id: WorkoutId) -> Option<MarkerHandle> {
    self
      .position(id)
      .ok()
      .and_then(|index| self.entries[index].marker)
  }

  /// Route one external event
  pub async fn handle(&mut self, event: AppEvent) -> Result<(), ControllerError> {
    debug!(?event, "handling event");
    match event {
      AppEvent::Start => self.start(),
      AppEvent::LocationResolved(coord) => self.location_resolved(coord).await,
      AppEvent::LocationFailed(err) => self.location_failed(&err),
      AppEvent::PermissionPromptAnswered { accepted } => self.permission_answered(accepted),
      AppEvent::MapClicked(coord) => self.show_form(coord),
      AppEvent::ActivityTypeChanged(kind) => self.toggle_metric_field(kind),
      AppEvent::FormSubmitted(input) => self.submit(&input).await.map(|_| ()),
      AppEvent::ListClicked { id, target } => self.list_clicked(id, target).await,
      AppEvent::KeyUp(key) => self.key_up(&key),
      AppEvent::DeleteAll => self.delete_all().await,
      AppEvent::Reset => self.reset(),
      AppEvent::Shutdown => Ok(()),
    }
  }

  /// -------------------------------------------------------------------------
  /// Startup
  /// -------------------------------------------------------------------------

  pub fn start(&mut self) -> Result<(), ControllerError> {
    info!("requesting current location");
    self.view.request_location(&self.config.geolocation)?;
    Ok(())
  }

  /// Center the map, listen for clicks and replay stored workouts
  pub async fn location_resolved(&mut self, coord: Coordinate) -> Result<(), ControllerError> {
    if self.map_ready {
      debug!(?coord, "map already centered, ignoring location");
      return Ok(());
    }

    self.map.center(coord, self.config.zoom, &self.config.tiles)?;

    let events = self.events.clone();
    self.map.on_click(Box::new(move |clicked| {
      if events.send(AppEvent::MapClicked(clicked)).is_err() {
        warn!("event loop closed, dropping map click");
      }
    }));
    self.map_ready = true;
    info!(lat = coord.lat, lng = coord.lng, "map ready");

    self.replay().await
  }

  async fn replay(&mut self) -> Result<(), ControllerError> {
    let stored = match self.repository.load().await {
      Ok(stored) => stored,
      Err(err) => {
        error!(error = %err, "failed to load stored workouts");
        return Err(err.into());
      }
    };

    let count = stored.len();
    for workout in stored {
      let workout = if self.position(workout.id()).is_ok() {
        let id = self.next_id(workout.id());
        warn!(old = workout.id(), new = id, "duplicate stored workout id, reassigning");
        workout.with_id(id)
      } else {
        workout
      };
      self.render(workout)?;
    }

    info!(count, "stored workouts replayed");
    Ok(())
  }

  pub fn location_failed(&mut self, err: &LocationError) -> Result<(), ControllerError> {
    warn!(error = %err, "location unavailable, prompting for permission");
    let message = permission_prompt_text(&self.config.settings_path);
    self
      .view
      .prompt_location_permission(&message, &self.config.settings_path)?;
    Ok(())
  }

  /// Accepting copies the settings path; declining asks for the location again
  pub fn permission_answered(&mut self, accepted: bool) -> Result<(), ControllerError> {
    if accepted {
      self.view.copy_to_clipboard(&self.config.settings_path)?;
      Ok(())
    } else {
      self.start()
    }
  }

  /// -------------------------------------------------------------------------
  /// Form
  /// -------------------------------------------------------------------------

  pub fn show_form(&mut self, coord: Coordinate) -> Result<(), ControllerError> {
    self.form = FormState::Visible { coord };
    self.view.show_form()?;
    Ok(())
  }

  pub fn hide_form(&mut self) -> Result<(), ControllerError> {
    self.form = FormState::Hidden;
    self.view.hide_form()?;
    Ok(())
  }

  pub fn toggle_metric_field(&mut self, kind: WorkoutType) -> Result<(), ControllerError> {
    self.view.set_metric_field(kind.metric_field())?;
    Ok(())
  }

  pub fn key_up(&mut self, key: &str) -> Result<(), ControllerError> {
    if key == "Escape" {
      self.hide_form()?;
    }
    Ok(())
  }

  /// Create a workout at the clicked location. Numbers are coerced, not
  /// validated.
  pub async fn submit(&mut self, input: &FormInput) -> Result<WorkoutId, ControllerError> {
    let FormState::Visible { coord } = self.form else {
      return Err(ControllerError::FormNotOpen);
    };

    let created_at = (self.clock)();
    let id = self.next_id(created_at.timestamp_millis());
    let workout = Workout::from_form(id, coord, input, created_at);

    self.render(workout)?;
    self.hide_form()?;
    info!(id, kind = %input.kind, "workout logged");

    self.persist().await?;
    Ok(id)
  }

  /// -------------------------------------------------------------------------
  /// List
  /// -------------------------------------------------------------------------

  pub async fn list_clicked(&mut self, id: WorkoutId, target: ListTarget) -> Result<(), ControllerError> {
    match target {
      ListTarget::Body => self.focus(id),
      ListTarget::DeleteControl => self.delete(id).await,
    }
  }

  /// Pan the map to a workout
  pub fn focus(&mut self, id: WorkoutId) -> Result<(), ControllerError> {
    let coord = self.entries[self.position(id)?].workout.coord();
    self.map.pan_to(coord, self.config.zoom, self.config.pan)?;
    Ok(())
  }

  /// Remove one workout, its marker and its list entry. The workout stays
  /// tracked until both are gone, so a failed delete can be retried.
  pub async fn delete(&mut self, id: WorkoutId) -> Result<(), ControllerError> {
    let index = self.position(id)?;

    if let Some(marker) = self.entries[index].marker {
      self.map.remove_marker(marker)?;
      self.entries[index].marker = None;
    }
    self.view.remove_entry(id)?;
    self.entries.remove(index);
    info!(id, "workout deleted");

    self.persist().await
  }

  /// Remove everything and persist the empty collection
  pub async fn delete_all(&mut self) -> Result<(), ControllerError> {
    let removed = self.clear_rendered()?;
    self.hide_form()?;
    info!(count = removed, "all workouts deleted");

    self.persist().await
  }

  /// Drop view and in-memory state and run startup again. Stored data is kept.
  pub fn reset(&mut self) -> Result<(), ControllerError> {
    self.clear_rendered()?;
    self.hide_form()?;
    self.map_ready = false;
    info!("controller reset");
    self.start()
  }

  /// -------------------------------------------------------------------------
  /// Helpers
  /// -------------------------------------------------------------------------

  /// Place the marker, prepend the list entry and track the workout.
  /// The marker is taken back down if the list entry can't be added.
  fn render(&mut self, workout: Workout) -> Result<(), ControllerError> {
    let marker = self
      .map
      .place_marker(workout.coord(), workout.workout_type(), &popup_text(&workout))?;
    if let Err(err) = self.view.prepend_entry(&WorkoutCard::from_workout(&workout)) {
      if let Err(map_err) = self.map.remove_marker(marker) {
        warn!(error = %map_err, "failed to remove marker of unlisted workout");
      }
      return Err(err.into());
    }

    self.entries.push(Entry {
      workout,
      marker: Some(marker),
    });
    Ok(())
  }

  fn position(&self, id: WorkoutId) -> Result<usize, ControllerError> {
    self
      .entries
      .iter()
      .position(|entry| entry.workout.id() == id)
      .ok_or(ControllerError::UnknownWorkout(id))
  }

  /// Remove every marker and list entry; returns how many workouts were dropped
  fn clear_rendered(&mut self) -> Result<usize, ControllerError> {
    let entries = std::mem::take(&mut self.entries);
    for marker in entries.iter().filter_map(|entry| entry.marker) {
      self.map.remove_marker(marker)?;
    }
    self.view.clear_entries()?;
    Ok(entries.len())
  }

  /// `candidate`, bumped past the largest id in use
  fn next_id(&self, candidate: WorkoutId) -> WorkoutId {
    match self.entries.iter().map(|entry| entry.workout.id()).max() {
      Some(largest) if candidate <= largest => largest + 1,
      _ => candidate,
    }
  }

  async fn persist(&mut self) -> Result<(), ControllerError> {
    let workouts = self.entries.iter().map(|entry| &entry.workout);
    if let Err(err) = self.repository.save(workouts).await {
      error!(error = %err, "failed to persist workouts");
      return Err(err.into());
    }
    Ok(())
  }
}
