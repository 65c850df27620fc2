use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::gallery::types::Screenshots;
use crate::routes::Route;
use crate::ui::components::{Carousel, ModalContent, VirtualizedGrid};
use crate::ui::page::{Page, PageAction};

const GRID_COLUMNS: usize = 2;

/// Screenshot groups in an on-demand grid.
pub struct ScreenshotsPage {
  data: Screenshots,
  grid: VirtualizedGrid,
}

impl ScreenshotsPage {
  pub fn new(data: Screenshots) -> Self {
    Self {
      data,
      grid: VirtualizedGrid::new(GRID_COLUMNS),
    }
  }
}

impl Page for ScreenshotsPage {
  fn route(&self) -> Route {
    Route::Screenshots
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    let total = self.data.groups.len();
    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.grid.move_selection(-1, 0, total),
      KeyCode::Char('l') | KeyCode::Right => self.grid.move_selection(1, 0, total),
      KeyCode::Char('j') | KeyCode::Down => self.grid.move_selection(0, 1, total),
      KeyCode::Char('k') | KeyCode::Up => self.grid.move_selection(0, -1, total),
      KeyCode::Enter => {
        if let Some(group) = self.data.groups.get(self.grid.selected()) {
          if !group.images.is_empty() {
            return PageAction::OpenModal(ModalContent::Gallery {
              title: group.title.clone(),
              carousel: Carousel::new(group.images.clone()),
            });
          }
        }
      }
      KeyCode::Char('r') => return PageAction::Reload { force: false },
      _ => {}
    }
    PageAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = format!(" Screenshots ({} groups) ", self.data.groups.len());
    let groups = &self.data.groups;
    self
      .grid
      .render(frame, area, groups.len(), &title, &|i| {
        format!("{} ({})", groups[i].title, groups[i].images.len())
      });
  }
}
