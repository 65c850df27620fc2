//! Application event bus.
//!
//! A single unbounded channel decouples every async producer (terminal
//! reader, page-load tasks) from the main loop, which is the only
//! consumer and the only place application state mutates.

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::gallery::error::LoadError;
use crate::gallery::types::Payload;
use crate::routes::Route;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// A page-load task finished. The generation ties the result to the
  /// navigation that started it; stale generations are discarded.
  PageLoaded {
    route: Route,
    generation: u64,
    result: Result<Arc<Payload>, LoadError>,
  },
}

/// Event bus producing terminal input, ticks, and task completions.
pub struct EventBus {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventBus {
  /// Create the bus and spawn the terminal event reader.
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let reader_tx = tx.clone();
    tokio::spawn(async move {
      loop {
        if event::poll(tick_rate).unwrap_or(false) {
          if let Ok(CrosstermEvent::Key(key)) = event::read() {
            if reader_tx.send(Event::Key(key)).is_err() {
              break;
            }
          }
        } else {
          // Tick
          if reader_tx.send(Event::Tick).is_err() {
            break;
          }
        }
      }
    });

    Self { tx, rx }
  }

  /// A sender handle for async tasks to publish completions.
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
