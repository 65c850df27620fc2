mod app;
mod commands;
mod config;
mod event;
mod gallery;
mod preload;
mod router;
mod routes;
mod store;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "A terminal UI for browsing a portfolio gallery site")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Site base URL, overriding the config file
  #[arg(short, long)]
  url: Option<String>,

  /// Section to open, as a name or site fragment (e.g. "#/videos")
  #[arg(short, long)]
  route: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // The terminal belongs to the UI; logs go to a file.
  let _log_guard = init_tracing()?;

  // Load configuration; --url alone is enough to run without a file.
  let config = match config::Config::load(args.config.as_deref()) {
    Ok(mut config) => {
      if let Some(url) = args.url {
        config.site.url = url;
      }
      config
    }
    Err(e) => match args.url {
      Some(url) => config::Config::from_url(url),
      None => return Err(e),
    },
  };

  let start_route = args.route.as_deref().map(routes::Route::parse_fragment);

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run(start_route).await?;

  Ok(())
}

fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("folio");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let appender = tracing_appender::rolling::never(&log_dir, "folio.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
