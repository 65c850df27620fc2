use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

use crate::gallery::types::Collections;
use crate::routes::Route;
use crate::ui::components::{Carousel, ModalContent, VirtualizedGrid};
use crate::ui::page::{Page, PageAction};

const GRID_COLUMNS: usize = 3;

/// Paginated collection browser. The one section with forced reload.
pub struct CollectionsPage {
  data: Collections,
  grid: VirtualizedGrid,
  page: usize,
  page_size: usize,
}

impl CollectionsPage {
  pub fn new(data: Collections, page_size: usize) -> Self {
    Self {
      data,
      grid: VirtualizedGrid::new(GRID_COLUMNS),
      page: 0,
      page_size: page_size.max(1),
    }
  }

  fn page_count(&self) -> usize {
    self.data.collections.len().div_ceil(self.page_size).max(1)
  }

  /// Index range of the collections on the current page.
  fn window(&self) -> std::ops::Range<usize> {
    let start = self.page * self.page_size;
    let end = (start + self.page_size).min(self.data.collections.len());
    start..end
  }

  fn turn_page(&mut self, delta: i32) {
    let pages = self.page_count() as i32;
    let next = (self.page as i32 + delta).clamp(0, pages - 1);
    if next as usize != self.page {
      self.page = next as usize;
      self.grid.reset();
    }
  }

  fn selected_collection(&self) -> Option<usize> {
    let window = self.window();
    let idx = window.start + self.grid.selected();
    (idx < window.end).then_some(idx)
  }
}

impl Page for CollectionsPage {
  fn route(&self) -> Route {
    Route::Collections
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    let visible = self.window().len();
    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.grid.move_selection(-1, 0, visible),
      KeyCode::Char('l') | KeyCode::Right => self.grid.move_selection(1, 0, visible),
      KeyCode::Char('j') | KeyCode::Down => self.grid.move_selection(0, 1, visible),
      KeyCode::Char('k') | KeyCode::Up => self.grid.move_selection(0, -1, visible),
      KeyCode::Char('n') | KeyCode::Char(']') => self.turn_page(1),
      KeyCode::Char('p') | KeyCode::Char('[') => self.turn_page(-1),
      KeyCode::Enter => {
        if let Some(idx) = self.selected_collection() {
          let collection = &self.data.collections[idx];
          let mut urls = Vec::with_capacity(collection.images.len() + 1);
          if !collection.cover.is_empty() {
            urls.push(collection.cover.clone());
          }
          urls.extend(collection.images.iter().cloned());
          return PageAction::OpenModal(ModalContent::Gallery {
            title: collection.title.clone(),
            carousel: Carousel::new(urls),
          });
        }
      }
      KeyCode::Char('r') => return PageAction::Reload { force: true },
      _ => {}
    }
    PageAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let window = self.window();
    let offset = window.start;
    let title = format!(
      " Collections ({}) — page {}/{} ",
      self.data.collections.len(),
      self.page + 1,
      self.page_count()
    );

    let collections = &self.data.collections;
    self.grid.render(frame, area, window.len(), &title, &|i| {
      let c = &collections[offset + i];
      format!("{} ({})", c.title, c.images.len())
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gallery::types::Collection;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn collections(count: usize) -> Collections {
    Collections {
      collections: (0..count)
        .map(|i| Collection {
          title: format!("set-{i}"),
          cover: format!("cover-{i}.jpg"),
          images: vec![format!("img-{i}.jpg")],
          ..Default::default()
        })
        .collect(),
    }
  }

  #[test]
  fn test_pagination_windows_and_clamps() {
    let mut page = CollectionsPage::new(collections(25), 10);
    assert_eq!(page.page_count(), 3);
    assert_eq!(page.window(), 0..10);

    page.turn_page(1);
    assert_eq!(page.window(), 10..20);
    page.turn_page(1);
    assert_eq!(page.window(), 20..25);
    // Clamped at the last page.
    page.turn_page(1);
    assert_eq!(page.window(), 20..25);
    page.turn_page(-5);
    assert_eq!(page.window(), 0..10);
  }

  #[test]
  fn test_enter_opens_gallery_with_cover_first() {
    let mut page = CollectionsPage::new(collections(3), 10);
    page.handle_key(key(KeyCode::Char('l')));

    let PageAction::OpenModal(ModalContent::Gallery { title, carousel }) =
      page.handle_key(key(KeyCode::Enter))
    else {
      panic!("expected gallery modal");
    };
    assert_eq!(title, "set-1");
    assert_eq!(carousel.selected_item(), Some("cover-1.jpg"));
    assert_eq!(carousel.len(), 2);
  }

  #[test]
  fn test_reload_is_forced() {
    let mut page = CollectionsPage::new(collections(1), 10);
    assert!(matches!(
      page.handle_key(key(KeyCode::Char('r'))),
      PageAction::Reload { force: true }
    ));
  }

  #[test]
  fn test_selection_is_scoped_to_current_page() {
    let mut page = CollectionsPage::new(collections(12), 10);
    page.turn_page(1);
    // Second page has 2 items; selection past the end maps to None.
    page.handle_key(key(KeyCode::Char('l')));
    assert_eq!(page.selected_collection(), Some(11));
  }
}
