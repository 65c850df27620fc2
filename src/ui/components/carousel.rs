use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// A sliding strip over an ordered set of media URLs with wrap-around
/// selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
  items: Vec<String>,
  selected: usize,
}

impl Carousel {
  pub fn new(items: Vec<String>) -> Self {
    Self { items, selected: 0 }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn selected_item(&self) -> Option<&str> {
    self.items.get(self.selected).map(String::as_str)
  }

  pub fn next(&mut self) {
    if !self.items.is_empty() {
      self.selected = (self.selected + 1) % self.items.len();
    }
  }

  pub fn prev(&mut self) {
    if !self.items.is_empty() {
      self.selected = (self.selected + self.items.len() - 1) % self.items.len();
    }
  }

  /// One-line strip: neighbors dimmed, the selected item highlighted,
  /// with a position indicator.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if self.items.is_empty() {
      return;
    }
    frame.render_widget(Paragraph::new(self.line()), area);
  }

  /// The strip as a single line, for embedding in list items.
  pub fn line(&self) -> Line<'static> {
    if self.items.is_empty() {
      return Line::default();
    }

    let mut spans = vec![Span::styled("◂ ", Style::default().fg(Color::DarkGray))];
    for (i, item) in self.items.iter().enumerate() {
      let name = super::super::truncate(display_name(item), 24);
      if i == self.selected {
        spans.push(Span::styled(
          name,
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        ));
      } else {
        spans.push(Span::styled(name, Style::default().fg(Color::DarkGray)));
      }
      spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
      format!("▸ [{}/{}]", self.selected + 1, self.items.len()),
      Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
  }
}

/// Final path segment, for compact display of long URLs.
fn display_name(url: &str) -> &str {
  url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_next_and_prev_wrap_around() {
    let mut carousel = Carousel::new(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()]);

    assert_eq!(carousel.selected_item(), Some("a.jpg"));
    carousel.prev();
    assert_eq!(carousel.selected_item(), Some("c.jpg"));
    carousel.next();
    carousel.next();
    assert_eq!(carousel.selected_item(), Some("b.jpg"));
    carousel.next();
    carousel.next();
    assert_eq!(carousel.selected_item(), Some("a.jpg"));
  }

  #[test]
  fn test_empty_carousel_is_safe() {
    let mut carousel = Carousel::new(vec![]);
    carousel.next();
    carousel.prev();
    assert!(carousel.selected_item().is_none());
  }

  #[test]
  fn test_display_name_strips_path() {
    assert_eq!(display_name("images/full/a.jpg"), "a.jpg");
    assert_eq!(display_name("plain.png"), "plain.png");
  }
}
