use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::gallery::types::Videos;
use crate::routes::Route;
use crate::ui::components::ModalContent;
use crate::ui::page::{Page, PageAction};
use crate::ui::{ensure_valid_selection, truncate};

pub struct VideosPage {
  data: Videos,
  list_state: ListState,
}

impl VideosPage {
  pub fn new(data: Videos) -> Self {
    let mut list_state = ListState::default();
    if !data.videos.is_empty() {
      list_state.select(Some(0));
    }
    Self { data, list_state }
  }
}

impl Page for VideosPage {
  fn route(&self) -> Route {
    Route::Videos
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Enter => {
        if let Some(video) = self
          .list_state
          .selected()
          .and_then(|i| self.data.videos.get(i))
        {
          return PageAction::OpenModal(ModalContent::Video {
            title: video.title.clone(),
            thumbnail: video.thumbnail.clone(),
            url: video.url.clone(),
          });
        }
      }
      KeyCode::Char('r') => return PageAction::Reload { force: false },
      _ => {}
    }
    PageAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.data.videos.len());

    let block = Block::default()
      .title(format!(" Videos ({}) ", self.data.videos.len()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.data.videos.is_empty() {
      let paragraph = Paragraph::new("No videos yet.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .data
      .videos
      .iter()
      .map(|video| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<40}", truncate(&video.title, 40)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("{:<12}", video.date),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(truncate(&video.description, 50)),
        ]))
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
