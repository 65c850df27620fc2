use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub site: SiteConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub loader: LoaderConfig,
  #[serde(default)]
  pub preload: PreloadConfig,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
  /// Base URL the JSON resources and media are served from.
  pub url: String,
  /// Static cache-busting token appended to every resource request.
  /// Bump it together with the site deployment.
  #[serde(default = "default_version")]
  pub version: String,
  /// Custom title for the header (defaults to the site host)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Byte budget across all cached section payloads.
  #[serde(default = "default_max_bytes")]
  pub max_bytes: usize,
  /// Maximum entry age in seconds before a cached payload is stale.
  #[serde(default = "default_max_age_secs")]
  pub max_age_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
  /// Fetch attempts per load before giving up.
  #[serde(default = "default_retries")]
  pub retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreloadConfig {
  /// Media prefetching can be switched off entirely.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// URLs fetched per prefetch batch.
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Items per page on paginated sections.
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

fn default_version() -> String {
  "1".to_string()
}

fn default_max_bytes() -> usize {
  crate::store::DEFAULT_MAX_BYTES
}

fn default_max_age_secs() -> i64 {
  crate::store::DEFAULT_MAX_AGE_SECS
}

fn default_retries() -> u32 {
  crate::gallery::loader::DEFAULT_RETRIES
}

fn default_true() -> bool {
  true
}

fn default_batch_size() -> usize {
  5
}

fn default_page_size() -> usize {
  12
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      max_bytes: default_max_bytes(),
      max_age_secs: default_max_age_secs(),
    }
  }
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self {
      retries: default_retries(),
    }
  }
}

impl Default for PreloadConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      batch_size: default_batch_size(),
    }
  }
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/folio/config.yaml\n\
                 or pass the site URL with --url."
      )),
    }
  }

  /// Minimal configuration for running against a URL with no file.
  pub fn from_url(url: String) -> Self {
    Self {
      site: SiteConfig {
        url,
        version: default_version(),
        title: None,
      },
      cache: CacheConfig::default(),
      loader: LoaderConfig::default(),
      preload: PreloadConfig::default(),
      ui: UiConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Header title: configured override or the site host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.site.title {
      return title.clone();
    }
    url::Url::parse(&self.site.url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.site.url.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_yaml_fills_defaults() {
    let config: Config = serde_yaml::from_str("site:\n  url: https://gallery.example\n").unwrap();

    assert_eq!(config.site.version, "1");
    assert_eq!(config.cache.max_bytes, crate::store::DEFAULT_MAX_BYTES);
    assert_eq!(config.cache.max_age_secs, 3600);
    assert_eq!(config.loader.retries, 3);
    assert!(config.preload.enabled);
    assert_eq!(config.preload.batch_size, 5);
    assert_eq!(config.ui.page_size, 12);
  }

  #[test]
  fn test_overrides_are_honored() {
    let yaml = r#"
site:
  url: https://gallery.example
  version: "42"
  title: My Gallery
cache:
  max_bytes: 1024
  max_age_secs: 60
preload:
  enabled: false
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.site.version, "42");
    assert_eq!(config.cache.max_bytes, 1024);
    assert!(!config.preload.enabled);
    assert_eq!(config.display_title(), "My Gallery");
  }

  #[test]
  fn test_display_title_falls_back_to_host() {
    let config = Config::from_url("https://gallery.example/base/".into());
    assert_eq!(config.display_title(), "gallery.example");
  }
}
