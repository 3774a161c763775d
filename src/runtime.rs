//! Single-consumer event loop
//!
//! Commands and map callbacks only enqueue `AppEvent`s. The loop task owns
//! the controller and handles events strictly in arrival order, so the
//! workout collection is never touched from two places at once.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::controller::{AppEvent, Controller, ControllerError};
use crate::map::MapView;
use crate::storage::KeyValueStore;
use crate::view::View;

pub type EventSender = UnboundedSender<AppEvent>;
pub type EventReceiver = UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
  mpsc::unbounded_channel()
}

pub struct EventLoop<M, V, S> {
  controller: Controller<M, V, S>,
  events: EventReceiver,
}

impl<M, V, S> EventLoop<M, V, S>
where
  M: MapView,
  V: View,
  S: KeyValueStore,
{
  pub fn new(controller: Controller<M, V, S>, events: EventReceiver) -> Self {
    Self { controller, events }
  }

  /// Handle events until `Shutdown` or until every sender is gone.
  /// Handler errors are logged and do not stop the loop.
  pub async fn run(mut self) -> Controller<M, V, S> {
    info!("event loop started");

    while let Some(event) = self.events.recv().await {
      if event == AppEvent::Shutdown {
        break;
      }
      if let Err(err) = self.controller.handle(event).await {
        log_handler_error(&err);
      }
    }

    info!("event loop stopped");
    self.controller
  }
}

fn log_handler_error(err: &ControllerError) {
  match err {
    // already logged where they happened
    ControllerError::Persistence(_) => {}
    other => warn!(error = %other, "event ignored"),
  }
}
