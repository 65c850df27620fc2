use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use super::components::ModalContent;
use crate::routes::Route;

/// Actions a page can request in response to user input
pub enum PageAction {
  /// No action needed
  None,
  /// Open the lightbox over the given content
  OpenModal(ModalContent),
  /// Re-request this section's data
  Reload { force: bool },
}

/// Trait for section pages
///
/// Pages own their widget state (selection, expansion, pagination) and
/// return actions for the App to execute. Data arrives fully validated;
/// pages never touch the network or the cache themselves.
pub trait Page {
  /// The section this page renders
  fn route(&self) -> Route;

  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> PageAction;

  /// Render the page to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);
}
