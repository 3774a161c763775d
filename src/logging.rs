use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,workout_map_lib=info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter (e.g. `RUST_LOG=workout_map_lib=debug`).
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let _ = fmt()
    .with_env_filter(filter)
    .with_timer(fmt::time::ChronoLocal::rfc_3339())
    .with_target(true)
    .with_level(true)
    .compact()
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_init_logging_twice() {
    init_logging();
    init_logging();
    tracing::info!("still logging");
  }
}
