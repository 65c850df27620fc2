use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::gallery::types::MainFeed;
use crate::routes::Route;
use crate::ui::components::{Carousel, ModalContent};
use crate::ui::page::{Page, PageAction};
use crate::ui::{ensure_valid_selection, truncate};

/// The feed: posts with expandable screenshot strips.
pub struct MainFeedPage {
  feed: MainFeed,
  list_state: ListState,
  /// Index of the expanded post and its screenshot strip, if any.
  expanded: Option<(usize, Carousel)>,
}

impl MainFeedPage {
  pub fn new(feed: MainFeed) -> Self {
    let mut list_state = ListState::default();
    if !feed.posts.is_empty() {
      list_state.select(Some(0));
    }
    Self {
      feed,
      list_state,
      expanded: None,
    }
  }

  fn selected_post(&self) -> Option<usize> {
    self.list_state.selected().filter(|i| *i < self.feed.posts.len())
  }

  fn toggle_expand(&mut self) {
    let Some(idx) = self.selected_post() else {
      return;
    };
    match &self.expanded {
      Some((open, _)) if *open == idx => self.expanded = None,
      _ => {
        let strip = Carousel::new(self.feed.posts[idx].screenshots.clone());
        self.expanded = Some((idx, strip));
      }
    }
  }

  /// The media the lightbox should open on for the selected post: the
  /// focused screenshot when expanded, the lead image otherwise.
  fn focused_media(&self) -> Option<ModalContent> {
    let idx = self.selected_post()?;
    let post = &self.feed.posts[idx];

    if let Some((open, strip)) = &self.expanded {
      if *open == idx {
        if let Some(url) = strip.selected_item() {
          return Some(ModalContent::Image {
            title: post.title.clone(),
            url: url.to_string(),
          });
        }
      }
    }

    if post.main_image.is_empty() {
      return None;
    }
    Some(ModalContent::Image {
      title: post.title.clone(),
      url: post.main_image.clone(),
    })
  }
}

impl Page for MainFeedPage {
  fn route(&self) -> Route {
    Route::Main
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Enter | KeyCode::Char(' ') => {
        self.toggle_expand();
      }
      KeyCode::Char('h') | KeyCode::Left => {
        if let Some((_, strip)) = &mut self.expanded {
          strip.prev();
        }
      }
      KeyCode::Char('l') | KeyCode::Right => {
        if let Some((_, strip)) = &mut self.expanded {
          strip.next();
        }
      }
      KeyCode::Char('o') => {
        if let Some(content) = self.focused_media() {
          return PageAction::OpenModal(content);
        }
      }
      KeyCode::Char('v') => {
        if let Some(idx) = self.selected_post() {
          let post = &self.feed.posts[idx];
          if let Some(video) = &post.video {
            return PageAction::OpenModal(ModalContent::Video {
              title: post.title.clone(),
              thumbnail: video.thumbnail.clone(),
              url: video.url.clone(),
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
    ensure_valid_selection(&mut self.list_state, self.feed.posts.len());

    let title = format!(
      " {} — {} posts ",
      self.feed.profile.name,
      self.feed.posts.len()
    );
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.feed.posts.is_empty() {
      let paragraph = Paragraph::new("Nothing posted yet.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .feed
      .posts
      .iter()
      .enumerate()
      .map(|(idx, post)| {
        let mut lines = vec![Line::from(vec![
          Span::styled(
            truncate(&post.title, 40),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(post.date.clone(), Style::default().fg(Color::DarkGray)),
          Span::raw(" "),
          Span::styled(
            post.tags.join(","),
            Style::default().fg(Color::Magenta),
          ),
          Span::styled(
            if post.video.is_some() { "  ▶" } else { "" },
            Style::default().fg(Color::Green),
          ),
        ])];

        if let Some((open, strip)) = &self.expanded {
          if *open == idx {
            lines.push(Line::from(Span::raw(format!(
              "  {}",
              truncate(&post.description, 100)
            ))));
            if !strip.is_empty() {
              lines.push(strip.line());
            }
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
