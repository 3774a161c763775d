use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;

use crate::storage::StoreError;

pub type DbPool = SqlitePool;

/// File name of the store inside the app data directory
pub const DB_FILE_NAME: &str = "workout-map.db";

/// Open (creating if needed) the SQLite file at `db_path` and run migrations
pub async fn initialize_db(db_path: &Path) -> Result<DbPool, StoreError> {
  if let Some(parent) = db_path.parent() {
    fs::create_dir_all(parent)?;
  }

  let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

  tracing::info!(path = %db_path.display(), "initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("database ready");

  Ok(pool)
}
