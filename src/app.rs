use crate::commands::{self, CommandAction};
use crate::config::Config;
use crate::event::{Event, EventBus};
use crate::gallery::client::GalleryClient;
use crate::gallery::error::LoadError;
use crate::gallery::loader::DataLoader;
use crate::preload::Preloader;
use crate::router::Router;
use crate::routes::{Route, ALL_ROUTES};
use crate::store::{NoopStorage, SqliteStorage, Store, StorageBackend};
use crate::ui;
use crate::ui::components::{draw_command_overlay, Modal, ModalContent};
use crate::ui::page::{Page, PageAction};
use crate::ui::pages::build_page;

use chrono::Duration as ChronoDuration;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

/// Setting key for the last visited section.
const LAST_ROUTE_KEY: &str = "last_route";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// What the content area currently shows.
enum PageSlot {
  Blank,
  Loading(Route),
  Ready(Box<dyn Page>),
  Failed(Route),
}

/// Main application state
pub struct App {
  config: Config,
  title: String,
  store: Arc<Store>,
  loader: DataLoader<GalleryClient>,
  preloader: Option<Arc<Preloader>>,
  router: Router,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  mode: Mode,
  command_input: String,
  selected_suggestion: usize,

  page: PageSlot,
  modal: Modal,
  /// One-line status notice, e.g. after a failed refresh.
  notice: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    // Storage is best-effort: without it the app runs memory-only.
    let backend: Arc<dyn StorageBackend> = match SqliteStorage::open() {
      Ok(storage) => Arc::new(storage),
      Err(e) => {
        warn!("cache storage unavailable, running memory-only: {e}");
        Arc::new(NoopStorage)
      }
    };
    let store = Arc::new(Store::new(
      backend,
      config.cache.max_bytes,
      ChronoDuration::seconds(config.cache.max_age_secs),
    ));

    let client = GalleryClient::new(&config.site.url, &config.site.version)?;

    let preloader = if config.preload.enabled {
      match Url::parse(&config.site.url) {
        Ok(base) => Some(Arc::new(Preloader::new(
          reqwest::Client::new(),
          base,
          config.preload.batch_size,
        ))),
        Err(_) => None,
      }
    } else {
      None
    };

    let loader = DataLoader::new(
      Arc::new(client),
      Arc::clone(&store),
      preloader.clone(),
      config.loader.retries,
    );

    let (tx, _rx) = mpsc::unbounded_channel();
    let title = config.display_title();

    Ok(Self {
      config,
      title,
      store,
      loader,
      preloader,
      router: Router::new(),
      event_tx: tx,
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      page: PageSlot::Blank,
      modal: Modal::default(),
      notice: None,
      should_quit: false,
    })
  }

  pub async fn run(&mut self, start_route: Option<Route>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventBus::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // First section: CLI deep link, then the remembered one, then Main.
    let initial = start_route
      .or_else(|| {
        self
          .store
          .setting(LAST_ROUTE_KEY)
          .map(|s| Route::parse_fragment(&s))
      })
      .unwrap_or(Route::Main);
    self.navigate(initial, false);

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| self.render(frame))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    self.router.cancel_active();
    if let Some(route) = self.router.current() {
      self.store.set_setting(LAST_ROUTE_KEY, route.name());
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Switch to `route`: cancel the in-flight load and start a new one.
  fn navigate(&mut self, route: Route, force: bool) {
    self.notice = None;
    self.modal = Modal::default();

    let ticket = self.router.navigate(route);
    // Only flash the loading panel when nothing cached can answer
    // quickly; a cache hit repaints within a tick anyway.
    if !self.store.has(route) {
      self.page = PageSlot::Loading(route);
    }

    let loader = self.loader.clone();
    let tx = self.event_tx.clone();
    tokio::spawn(async move {
      let result = match ticket.route {
        Route::Main => loader.load_main(&ticket.cancel).await,
        Route::Collections => loader.load_collections(force, &ticket.cancel).await,
        Route::Screenshots => loader.load_screenshots(&ticket.cancel).await,
        Route::Videos => loader.load_videos(&ticket.cancel).await,
        Route::History => loader.load_history(&ticket.cancel).await,
        Route::About => loader.load_about(&ticket.cancel).await,
      };
      let _ = tx.send(Event::PageLoaded {
        route: ticket.route,
        generation: ticket.generation,
        result,
      });
    });
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::PageLoaded {
        route,
        generation,
        result,
      } => self.handle_page_loaded(route, generation, result),
    }
  }

  fn handle_page_loaded(
    &mut self,
    route: Route,
    generation: u64,
    result: Result<Arc<crate::gallery::types::Payload>, LoadError>,
  ) {
    // A newer navigation owns the screen; this result is history.
    if !self.router.is_current(generation) {
      debug!("discarding stale load result for {route}");
      return;
    }

    match result {
      Ok(payload) => {
        self.page = PageSlot::Ready(build_page(&payload, self.config.ui.page_size));
      }
      Err(LoadError::Cancelled) => {}
      Err(e) => {
        warn!("load failed for {route}: {e}");
        // Offline grace: keep showing what we have, if anything.
        if let Some(stale) = self.store.get(route) {
          self.page = PageSlot::Ready(build_page(&stale, self.config.ui.page_size));
          self.notice = Some("Couldn't refresh; showing cached data.".to_string());
        } else {
          self.page = PageSlot::Failed(route);
        }
      }
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    // The lightbox swallows everything while open.
    if self.modal.is_open() {
      self.modal.handle_key(key);
      return;
    }

    match key.code {
      // Quit
      KeyCode::Char('q') => {
        self.should_quit = true;
      }
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Mode switch
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }

      // Section tabs
      KeyCode::Char(c @ '1'..='6') => {
        let idx = c as usize - '1' as usize;
        self.navigate(ALL_ROUTES[idx], false);
      }
      KeyCode::Tab => {
        let next = match self.router.current() {
          Some(current) => {
            let idx = ALL_ROUTES.iter().position(|r| *r == current).unwrap_or(0);
            ALL_ROUTES[(idx + 1) % ALL_ROUTES.len()]
          }
          None => Route::Main,
        };
        self.navigate(next, false);
      }

      _ => {
        if let PageSlot::Ready(page) = &mut self.page {
          let action = page.handle_key(key);
          self.apply_page_action(action);
        }
      }
    }
  }

  fn apply_page_action(&mut self, action: PageAction) {
    match action {
      PageAction::None => {}
      PageAction::OpenModal(content) => {
        self.prefetch_modal_media(&content);
        self.modal.open(content);
      }
      PageAction::Reload { force } => {
        if let Some(route) = self.router.current() {
          self.navigate(route, force && route.supports_force_reload());
        }
      }
    }
  }

  /// Warm the media behind a lightbox layer so it is ready by the time
  /// the user follows the URL.
  fn prefetch_modal_media(&self, content: &ModalContent) {
    let Some(preloader) = &self.preloader else {
      return;
    };
    let preloader = Arc::clone(preloader);

    match content {
      ModalContent::Image { url, .. } => {
        let url = url.clone();
        tokio::spawn(async move { preloader.preload_image(&url).await });
      }
      ModalContent::Video { url, thumbnail, .. } => {
        let url = url.clone();
        let thumbnail = thumbnail.clone();
        tokio::spawn(async move {
          preloader.preload_image(&thumbnail).await;
          preloader.preload_video(&url).await;
        });
      }
      ModalContent::Gallery { carousel, .. } => {
        if let Some(url) = carousel.selected_item() {
          let url = url.to_string();
          tokio::spawn(async move { preloader.preload_image(&url).await });
        }
      }
    }
  }

  fn handle_command_mode_key(&mut self, key: crossterm::event::KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        // Navigate autocomplete suggestions backwards
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0; // Reset selection on input change
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    let input = self.command_input.trim().to_string();

    // Deep links pasted from the site: ":goto #/videos"
    if let Some(fragment) = input.strip_prefix("goto ") {
      let route = Route::parse_fragment(fragment.trim());
      self.navigate(route, false);
      self.command_input.clear();
      return;
    }

    // Get the command to execute - either from selected suggestion or direct input
    let suggestions = commands::get_suggestions(&self.command_input);
    let action = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      Some(suggestions[self.selected_suggestion].action)
    } else {
      let lower = input.to_lowercase();
      commands::COMMANDS
        .iter()
        .find(|c| c.name == lower || c.aliases.contains(&lower.as_str()))
        .map(|c| c.action)
    };

    match action {
      Some(CommandAction::Go(route)) => self.navigate(route, false),
      Some(CommandAction::Reload) => {
        if let Some(route) = self.router.current() {
          self.navigate(route, route.supports_force_reload());
        }
      }
      Some(CommandAction::ClearCache) => {
        self.store.clear_all();
        self.notice = Some("Cache cleared.".to_string());
      }
      Some(CommandAction::Quit) => {
        self.should_quit = true;
      }
      None => {
        // Unknown command
      }
    }
    self.command_input.clear();
  }

  fn render(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header with section tabs
        Constraint::Min(1),    // Content
        Constraint::Length(1), // Status bar
      ])
      .split(frame.area());

    ui::draw_header(frame, chunks[0], &self.title, self.router.current());

    match &mut self.page {
      PageSlot::Blank => {}
      PageSlot::Loading(route) => ui::draw_loading(frame, chunks[1], *route),
      PageSlot::Ready(page) => page.render(frame, chunks[1]),
      PageSlot::Failed(route) => ui::draw_error_panel(frame, chunks[1], *route),
    }

    ui::draw_status_bar(frame, chunks[2], self.notice.as_deref());

    if self.modal.is_open() {
      self.modal.render(frame, chunks[1]);
    }

    if self.mode == Mode::Command {
      let suggestions = commands::get_suggestions(&self.command_input);
      draw_command_overlay(
        frame,
        chunks[1],
        &self.command_input,
        &suggestions,
        self.selected_suggestion,
      );
    }
  }
}
