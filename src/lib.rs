pub mod config;
pub mod controller;
pub mod db;
pub mod geolocation;
pub mod logging;
pub mod map;
pub mod models;
pub mod persistence;
pub mod runtime;
pub mod storage;
pub mod view;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
pub mod webview;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
  use std::sync::Arc;
  use tauri::Manager;

  use crate::commands::{self, AppState};
  use crate::config::AppConfig;
  use crate::controller::Controller;
  use crate::persistence::WorkoutRepository;
  use crate::runtime::{self, EventLoop};
  use crate::storage::SqliteStore;
  use crate::webview::{self, ClickSlot, WebviewMap, WebviewView};
  use crate::{db, logging};

  #[cfg_attr(mobile, tauri::mobile_entry_point)]
  pub fn run() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
      tracing::error!(error = %e, "invalid configuration, using defaults");
      AppConfig::default()
    });

    tauri::Builder::default()
      .setup(move |app| {
        let app_handle = app.handle().clone();

        let db_path = match &config.db_path {
          Some(path) => path.clone(),
          None => webview::default_db_path(&app_handle)?,
        };
        let pool = tauri::async_runtime::block_on(db::initialize_db(&db_path))?;

        let (events, receiver) = runtime::channel();
        let clicks = ClickSlot::default();
        let controller = Controller::new(
          WebviewMap::new(app_handle.clone(), clicks.clone()),
          WebviewView::new(app_handle.clone()),
          WorkoutRepository::with_key(SqliteStore::new(pool), &config.storage_key),
          config.clone(),
          events.clone(),
        );
        tauri::async_runtime::spawn(EventLoop::new(controller, receiver).run());

        app_handle.manage(Arc::new(AppState { events, clicks }));
        tracing::info!("workout map ready");
        Ok(())
      })
      .invoke_handler(tauri::generate_handler![
        commands::app_ready,
        commands::location_resolved,
        commands::location_failed,
        commands::permission_prompt_answered,
        commands::map_clicked,
        commands::activity_type_changed,
        commands::submit_workout,
        commands::workout_list_clicked,
        commands::key_up,
        commands::delete_all_workouts,
        commands::reset_app,
      ])
      .run(tauri::generate_context!())
      .expect("error while running tauri application");
  }
}
