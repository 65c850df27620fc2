//! Storage backends for the route cache and the durable settings store.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::routes::Route;

/// A route-cache row as persisted: serialized payload plus timestamps.
#[derive(Debug, Clone)]
pub struct PersistedEntry {
  pub payload: Vec<u8>,
  pub last_used: DateTime<Utc>,
  pub last_loaded: DateTime<Utc>,
}

/// Persistence seam for the Store.
///
/// The route cache is session-scoped; settings are durable and live in
/// their own namespace so route eviction can never touch them. Backends
/// report failures through `Result`, but the Store treats every failure
/// as a cue to degrade to memory-only operation, never as an error to
/// propagate.
pub trait StorageBackend: Send + Sync {
  fn load_route(&self, route: Route) -> Result<Option<PersistedEntry>>;
  fn store_route(&self, route: Route, entry: &PersistedEntry) -> Result<()>;
  fn remove_route(&self, route: Route) -> Result<()>;
  fn clear_routes(&self) -> Result<()>;

  fn setting(&self, key: &str) -> Result<Option<String>>;
  fn set_setting(&self, key: &str, value: &str) -> Result<()>;
  fn remove_setting(&self, key: &str) -> Result<()>;
  fn clear_settings(&self) -> Result<()>;
}

/// Backend that persists nothing. Used when SQLite is unavailable so the
/// rest of the app keeps working memory-only.
pub struct NoopStorage;

impl StorageBackend for NoopStorage {
  fn load_route(&self, _route: Route) -> Result<Option<PersistedEntry>> {
    Ok(None)
  }

  fn store_route(&self, _route: Route, _entry: &PersistedEntry) -> Result<()> {
    Ok(())
  }

  fn remove_route(&self, _route: Route) -> Result<()> {
    Ok(())
  }

  fn clear_routes(&self) -> Result<()> {
    Ok(())
  }

  fn setting(&self, _key: &str) -> Result<Option<String>> {
    Ok(None)
  }

  fn set_setting(&self, _key: &str, _value: &str) -> Result<()> {
    Ok(())
  }

  fn remove_setting(&self, _key: &str) -> Result<()> {
    Ok(())
  }

  fn clear_settings(&self) -> Result<()> {
    Ok(())
  }
}

/// SQLite-backed storage.
///
/// `route_cache` rows from earlier sessions are dropped at open, which
/// gives the route cache session lifetime while `settings` persists
/// indefinitely.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS route_cache (
    route TEXT PRIMARY KEY,
    payload BLOB NOT NULL,
    last_used TEXT NOT NULL,
    last_loaded TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

impl SqliteStorage {
  /// Open the storage at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open the storage at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.init()?;

    Ok(storage)
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("folio").join("cache.db"))
  }

  /// Create tables and start a fresh session for the route cache.
  fn init(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    // Route cache rows are scoped to one session; settings survive.
    conn
      .execute("DELETE FROM route_cache", [])
      .map_err(|e| eyre!("Failed to reset session cache: {}", e))?;

    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl StorageBackend for SqliteStorage {
  fn load_route(&self, route: Route) -> Result<Option<PersistedEntry>> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, String, String)> = conn
      .query_row(
        "SELECT payload, last_used, last_loaded FROM route_cache WHERE route = ?",
        params![route.name()],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache row: {}", e))?;

    match row {
      Some((payload, used, loaded)) => Ok(Some(PersistedEntry {
        payload,
        last_used: parse_datetime(&used)?,
        last_loaded: parse_datetime(&loaded)?,
      })),
      None => Ok(None),
    }
  }

  fn store_route(&self, route: Route, entry: &PersistedEntry) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO route_cache (route, payload, last_used, last_loaded)
         VALUES (?, ?, ?, ?)",
        params![
          route.name(),
          entry.payload,
          entry.last_used.to_rfc3339(),
          entry.last_loaded.to_rfc3339()
        ],
      )
      .map_err(|e| eyre!("Failed to store cache row: {}", e))?;

    Ok(())
  }

  fn remove_route(&self, route: Route) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "DELETE FROM route_cache WHERE route = ?",
        params![route.name()],
      )
      .map_err(|e| eyre!("Failed to delete cache row: {}", e))?;

    Ok(())
  }

  fn clear_routes(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM route_cache", [])
      .map_err(|e| eyre!("Failed to clear route cache: {}", e))?;

    Ok(())
  }

  fn setting(&self, key: &str) -> Result<Option<String>> {
    let conn = self.lock()?;

    conn
      .query_row(
        "SELECT value FROM settings WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read setting: {}", e))
  }

  fn set_setting(&self, key: &str, value: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to store setting: {}", e))?;

    Ok(())
  }

  fn remove_setting(&self, key: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM settings WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to delete setting: {}", e))?;

    Ok(())
  }

  fn clear_settings(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM settings", [])
      .map_err(|e| eyre!("Failed to clear settings: {}", e))?;

    Ok(())
  }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn open_temp() -> (tempfile::TempDir, SqliteStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open_at(&dir.path().join("cache.db")).unwrap();
    (dir, storage)
  }

  fn entry(bytes: &[u8]) -> PersistedEntry {
    PersistedEntry {
      payload: bytes.to_vec(),
      last_used: Utc::now(),
      last_loaded: Utc::now(),
    }
  }

  #[test]
  fn test_route_roundtrip() {
    let (_dir, storage) = open_temp();

    storage.store_route(Route::Main, &entry(b"{\"a\":1}")).unwrap();
    let restored = storage.load_route(Route::Main).unwrap().unwrap();
    assert_eq!(restored.payload, b"{\"a\":1}");

    assert!(storage.load_route(Route::Videos).unwrap().is_none());
  }

  #[test]
  fn test_reopen_clears_route_cache_but_keeps_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let storage = SqliteStorage::open_at(&path).unwrap();
    storage.store_route(Route::Main, &entry(b"{}")).unwrap();
    storage.set_setting("last_route", "videos").unwrap();
    drop(storage);

    let reopened = SqliteStorage::open_at(&path).unwrap();
    assert!(reopened.load_route(Route::Main).unwrap().is_none());
    assert_eq!(
      reopened.setting("last_route").unwrap().as_deref(),
      Some("videos")
    );
  }

  #[test]
  fn test_settings_lifecycle() {
    let (_dir, storage) = open_temp();

    storage.set_setting("a", "1").unwrap();
    storage.set_setting("b", "2").unwrap();
    storage.remove_setting("a").unwrap();
    assert!(storage.setting("a").unwrap().is_none());
    assert_eq!(storage.setting("b").unwrap().as_deref(), Some("2"));

    storage.clear_settings().unwrap();
    assert!(storage.setting("b").unwrap().is_none());
  }

  #[test]
  fn test_clear_routes_leaves_settings() {
    let (_dir, storage) = open_temp();

    storage.store_route(Route::About, &entry(b"{}")).unwrap();
    storage.set_setting("k", "v").unwrap();
    storage.clear_routes().unwrap();

    assert!(storage.load_route(Route::About).unwrap().is_none());
    assert_eq!(storage.setting("k").unwrap().as_deref(), Some("v"));
  }
}
