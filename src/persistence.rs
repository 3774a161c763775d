use serde::Serialize;

use crate::models::Workout;
use crate::storage::{KeyValueStore, StoreError};

/// Key the workout collection is stored under
pub const DEFAULT_STORAGE_KEY: &str = "workouts";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Stored workouts could not be parsed: {0}")]
  Corrupt(#[source] serde_json::Error),

  #[error("Failed to serialize workouts: {0}")]
  Serialize(#[source] serde_json::Error),
}

impl Serialize for PersistenceError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Reads and writes the whole workout collection as one JSON array,
/// oldest first.
#[derive(Debug, Clone)]
pub struct WorkoutRepository<S> {
  store: S,
  key: String,
}

impl<S: KeyValueStore> WorkoutRepository<S> {
  pub fn new(store: S) -> Self {
    Self::with_key(store, DEFAULT_STORAGE_KEY)
  }

  pub fn with_key(store: S, key: &str) -> Self {
    Self {
      store,
      key: key.to_string(),
    }
  }

  /// Overwrite the stored collection
  pub async fn save<'a, I>(&self, workouts: I) -> Result<(), PersistenceError>
  where
    I: IntoIterator<Item = &'a Workout>,
  {
    let records: Vec<&Workout> = workouts.into_iter().collect();
    let json = serde_json::to_string(&records).map_err(PersistenceError::Serialize)?;
    let count = records.len();

    self.store.set(&self.key, &json).await?;
    tracing::debug!(key = %self.key, count, "workouts saved");
    Ok(())
  }

  /// Stored collection, or empty when nothing was saved yet.
  /// Unparseable data is an error, not an empty list.
  pub async fn load(&self) -> Result<Vec<Workout>, PersistenceError> {
    let Some(raw) = self.store.get(&self.key).await? else {
      return Ok(Vec::new());
    };

    // `null` is what an absent collection looks like after a manual wipe
    let workouts: Option<Vec<Workout>> =
      serde_json::from_str(&raw).map_err(PersistenceError::Corrupt)?;
    Ok(workouts.unwrap_or_default())
  }

  pub async fn clear(&self) -> Result<(), PersistenceError> {
    self.store.remove(&self.key).await?;
    Ok(())
  }
}
