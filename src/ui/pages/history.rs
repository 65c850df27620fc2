use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use std::collections::HashSet;

use crate::gallery::types::History;
use crate::routes::Route;
use crate::ui::components::ModalContent;
use crate::ui::page::{Page, PageAction};
use crate::ui::{ensure_valid_selection, truncate};

/// Chronological changelog with expandable notes.
pub struct HistoryPage {
  data: History,
  list_state: ListState,
  expanded: HashSet<usize>,
}

impl HistoryPage {
  pub fn new(data: History) -> Self {
    let mut list_state = ListState::default();
    if !data.entries.is_empty() {
      list_state.select(Some(0));
    }
    Self {
      data,
      list_state,
      expanded: HashSet::new(),
    }
  }
}

impl Page for HistoryPage {
  fn route(&self) -> Route {
    Route::History
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Enter | KeyCode::Char(' ') => {
        if let Some(idx) = self.list_state.selected() {
          if !self.expanded.remove(&idx) {
            self.expanded.insert(idx);
          }
        }
      }
      KeyCode::Char('o') => {
        if let Some(entry) = self
          .list_state
          .selected()
          .and_then(|i| self.data.entries.get(i))
        {
          if let Some(image) = &entry.image {
            return PageAction::OpenModal(ModalContent::Image {
              title: entry.title.clone(),
              url: image.clone(),
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
    ensure_valid_selection(&mut self.list_state, self.data.entries.len());

    let block = Block::default()
      .title(format!(" History ({} entries) ", self.data.entries.len()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.data.entries.is_empty() {
      let paragraph = Paragraph::new("No history recorded.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .data
      .entries
      .iter()
      .enumerate()
      .map(|(idx, entry)| {
        let mut lines = vec![Line::from(vec![
          Span::styled(
            format!("{:<12}", entry.date),
            Style::default().fg(Color::DarkGray),
          ),
          Span::styled(
            truncate(&entry.title, 60),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            if entry.image.is_some() { "  ◆" } else { "" },
            Style::default().fg(Color::Green),
          ),
        ])];

        if self.expanded.contains(&idx) {
          for note in &entry.notes {
            lines.push(Line::from(Span::raw(format!("    · {}", note))));
          }
        }

        ListItem::new(lines)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}
