use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::carousel::Carousel;

/// What a modal layer shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalContent {
  Image {
    title: String,
    url: String,
  },
  Video {
    title: String,
    thumbnail: String,
    url: String,
  },
  Gallery {
    title: String,
    carousel: Carousel,
  },
}

/// Lightbox overlay with a content stack.
///
/// Opening pushes a layer; Esc pops one; the overlay disappears when
/// the stack empties. While open it consumes every key, so page
/// bindings cannot fire underneath it.
#[derive(Debug, Default)]
pub struct Modal {
  stack: Vec<ModalContent>,
}

impl Modal {
  pub fn is_open(&self) -> bool {
    !self.stack.is_empty()
  }

  #[allow(dead_code)]
  pub fn depth(&self) -> usize {
    self.stack.len()
  }

  pub fn open(&mut self, content: ModalContent) {
    self.stack.push(content);
  }

  pub fn close_top(&mut self) {
    self.stack.pop();
  }

  /// Handle a key while open. Returns `true` when the key was consumed.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if self.stack.is_empty() {
      return false;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.close_top();
      }
      KeyCode::Left | KeyCode::Char('h') => {
        if let Some(ModalContent::Gallery { carousel, .. }) = self.stack.last_mut() {
          carousel.prev();
        }
      }
      KeyCode::Right | KeyCode::Char('l') => {
        if let Some(ModalContent::Gallery { carousel, .. }) = self.stack.last_mut() {
          carousel.next();
        }
      }
      KeyCode::Enter => {
        // Zoom the focused gallery item into its own layer.
        if let Some(ModalContent::Gallery { title, carousel }) = self.stack.last() {
          if let Some(url) = carousel.selected_item() {
            let layer = ModalContent::Image {
              title: title.clone(),
              url: url.to_string(),
            };
            self.stack.push(layer);
          }
        }
      }
      _ => {}
    }
    true
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect) {
    let Some(content) = self.stack.last() else {
      return;
    };

    let width = (area.width * 70 / 100).clamp(30, 80);
    let height = 8u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height.min(area.height));

    frame.render_widget(Clear, overlay);

    let title = match content {
      ModalContent::Image { title, .. } => format!(" {} ", title),
      ModalContent::Video { title, .. } => format!(" {} (video) ", title),
      ModalContent::Gallery { title, carousel } => {
        format!(" {} ({}) ", title, carousel.len())
      }
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    if inner.height == 0 {
      return;
    }

    match content {
      ModalContent::Image { url, .. } => {
        let lines = vec![
          Line::from(Span::styled(url.clone(), Style::default().fg(Color::Cyan))),
          Line::default(),
          hint_line("Esc:close"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
      }
      ModalContent::Video { thumbnail, url, .. } => {
        let lines = vec![
          Line::from(vec![
            Span::styled("video  ", Style::default().fg(Color::DarkGray)),
            Span::styled(url.clone(), Style::default().fg(Color::Cyan)),
          ]),
          Line::from(vec![
            Span::styled("poster ", Style::default().fg(Color::DarkGray)),
            Span::raw(thumbnail.clone()),
          ]),
          Line::default(),
          hint_line("Esc:close"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
      }
      ModalContent::Gallery { .. } => {
        let chunks = Layout::default()
          .direction(Direction::Vertical)
          .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
          ])
          .split(inner);

        if let Some(ModalContent::Gallery { carousel, .. }) = self.stack.last() {
          carousel.render(frame, chunks[0]);
          if let Some(url) = carousel.selected_item() {
            frame.render_widget(
              Paragraph::new(Span::styled(
                url.to_string(),
                Style::default().fg(Color::Cyan),
              )),
              chunks[1],
            );
          }
        }
        frame.render_widget(
          Paragraph::new(hint_line("h/l:slide  Enter:zoom  Esc:close")),
          chunks[2],
        );
      }
    }
  }
}

fn hint_line(hint: &str) -> Line<'static> {
  Line::from(Span::styled(
    hint.to_string(),
    Style::default().fg(Color::DarkGray),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn gallery() -> ModalContent {
    ModalContent::Gallery {
      title: "Set".into(),
      carousel: Carousel::new(vec!["a.jpg".into(), "b.jpg".into()]),
    }
  }

  #[test]
  fn test_closed_modal_consumes_nothing() {
    let mut modal = Modal::default();
    assert!(!modal.handle_key(key(KeyCode::Esc)));
    assert!(!modal.is_open());
  }

  #[test]
  fn test_escape_pops_one_layer_at_a_time() {
    let mut modal = Modal::default();
    modal.open(gallery());
    modal.open(ModalContent::Image {
      title: "Zoom".into(),
      url: "a.jpg".into(),
    });
    assert_eq!(modal.depth(), 2);

    assert!(modal.handle_key(key(KeyCode::Esc)));
    assert_eq!(modal.depth(), 1);
    assert!(modal.handle_key(key(KeyCode::Esc)));
    assert!(!modal.is_open());
  }

  #[test]
  fn test_enter_zooms_gallery_item() {
    let mut modal = Modal::default();
    modal.open(gallery());
    modal.handle_key(key(KeyCode::Right));
    modal.handle_key(key(KeyCode::Enter));

    assert_eq!(modal.depth(), 2);
    match modal.stack.last().unwrap() {
      ModalContent::Image { url, .. } => assert_eq!(url, "b.jpg"),
      other => panic!("unexpected layer: {other:?}"),
    }
  }

  #[test]
  fn test_open_modal_consumes_unbound_keys() {
    let mut modal = Modal::default();
    modal.open(gallery());
    assert!(modal.handle_key(key(KeyCode::Char('x'))));
    assert_eq!(modal.depth(), 1);
  }
}
