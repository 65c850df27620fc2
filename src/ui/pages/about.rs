use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::gallery::types::About;
use crate::routes::Route;
use crate::ui::page::{Page, PageAction};

pub struct AboutPage {
  data: About,
}

impl AboutPage {
  pub fn new(data: About) -> Self {
    Self { data }
  }
}

impl Page for AboutPage {
  fn route(&self) -> Route {
    Route::About
  }

  fn handle_key(&mut self, key: KeyEvent) -> PageAction {
    match key.code {
      KeyCode::Char('r') => PageAction::Reload { force: false },
      _ => PageAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" About {} ", self.data.profile.name))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines = vec![
      Line::from(Span::styled(
        self.data.profile.name.clone(),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )),
      Line::from(Span::raw(self.data.profile.bio.clone())),
      Line::default(),
    ];

    if !self.data.skills.is_empty() {
      lines.push(Line::from(vec![
        Span::styled("skills  ", Style::default().fg(Color::DarkGray)),
        Span::raw(self.data.skills.join(", ")),
      ]));
      lines.push(Line::default());
    }

    for link in &self.data.links {
      lines.push(Line::from(vec![
        Span::styled(
          format!("{:<12}", link.label),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(link.url.clone(), Style::default().fg(Color::Cyan)),
      ]));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}
