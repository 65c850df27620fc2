pub mod components;
pub mod page;
pub mod pages;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, ListState, Paragraph};

use crate::routes::{Route, ALL_ROUTES};

/// Header line: site title plus the section tabs, with the active
/// section marked.
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, active: Option<Route>) {
  let mut spans = vec![
    Span::styled(
      format!(" {} ", title),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw("  "),
  ];

  for (i, route) in ALL_ROUTES.into_iter().enumerate() {
    let label = format!("{}:{} ", i + 1, route.title());
    if Some(route) == active {
      spans.push(Span::styled(
        label,
        Style::default()
          .fg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ));
    } else {
      spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
    }
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Status bar: a notice if one is pending, otherwise the key hints.
pub fn draw_status_bar(frame: &mut Frame, area: Rect, notice: Option<&str>) {
  let (content, style) = match notice {
    Some(text) => (text.to_string(), Style::default().fg(Color::Yellow)),
    None => (
      " :command  1-6:sections  j/k:nav  Enter:select  q:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}

/// Placeholder while a section is loading.
pub fn draw_loading(frame: &mut Frame, area: Rect, route: Route) {
  let block = Block::default()
    .title(format!(" {} ", route.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  let paragraph = Paragraph::new("Loading...")
    .block(block)
    .style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}

/// Static, non-technical failure panel.
pub fn draw_error_panel(frame: &mut Frame, area: Rect, route: Route) {
  let block = Block::default()
    .title(format!(" {} ", route.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let paragraph = Paragraph::new(
    "Couldn't load this section.\n\
     Check your connection and try :reload.",
  )
  .block(block)
  .style(Style::default().fg(Color::DarkGray));
  frame.render_widget(paragraph, area);
}

/// Keep a list selection inside bounds after the data changed.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    match state.selected() {
      Some(selected) if selected < len => {}
      _ => state.select(Some(len - 1)),
    }
  }
}

/// Truncate with an ellipsis when over `max_len`.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_strings_pass_through() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_long_strings_get_ellipsis() {
    assert_eq!(truncate("abcdefghij", 8), "abcde...");
  }

  #[test]
  fn test_ensure_valid_selection_clamps() {
    let mut state = ListState::default();
    state.select(Some(9));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
