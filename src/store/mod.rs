//! Per-route payload cache with LRU eviction and TTL expiry.
//!
//! Two tiers: an in-memory map (authoritative) mirrored into a
//! session-scoped persisted backing store, plus a separate durable
//! settings table. Persistence failures never reach callers; the store
//! degrades to memory-only operation and logs at warn level.

pub mod backend;

pub use backend::{NoopStorage, PersistedEntry, SqliteStorage, StorageBackend};

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::gallery::types::Payload;
use crate::routes::{Route, ALL_ROUTES};

/// Default byte budget across all cached payloads: 5 MB.
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Default maximum entry age: one hour.
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60;

#[derive(Debug)]
struct Entry {
  payload: Arc<Payload>,
  bytes: usize,
  last_used: DateTime<Utc>,
  last_loaded: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
  entries: HashMap<Route, Entry>,
  total_bytes: usize,
}

/// Route-payload cache. Shared via `Arc`; all methods take `&self`.
pub struct Store {
  inner: Mutex<Inner>,
  backend: Arc<dyn StorageBackend>,
  max_bytes: usize,
  max_age: Duration,
}

impl Store {
  pub fn new(backend: Arc<dyn StorageBackend>, max_bytes: usize, max_age: Duration) -> Self {
    Self {
      inner: Mutex::new(Inner::default()),
      backend,
      max_bytes,
      max_age,
    }
  }

  /// Return the cached payload for `route`, restoring from the backing
  /// store on a memory miss. A memory hit refreshes the last-used
  /// timestamp; a restore refreshes both timestamps and mirrors the
  /// entry back into memory. Performs no freshness check; callers that
  /// need one use `take_fresh`.
  pub fn get(&self, route: Route) -> Option<Arc<Payload>> {
    let mut inner = self.lock();

    if let Some(entry) = inner.entries.get_mut(&route) {
      entry.last_used = Utc::now();
      return Some(Arc::clone(&entry.payload));
    }

    self.restore(&mut inner, route).map(|(payload, _)| payload)
  }

  /// Freshness check and read in one operation: returns the payload only
  /// if its age since last load is within the max age, evicting it
  /// otherwise. The DataLoader uses this so a TTL expiry can never slip
  /// in between a `has` probe and a `get`.
  pub fn take_fresh(&self, route: Route) -> Option<Arc<Payload>> {
    let mut inner = self.lock();

    if let Some(entry) = inner.entries.get_mut(&route) {
      if Self::expired_at(entry.last_loaded, self.max_age) {
        self.remove_entry(&mut inner, route);
        return None;
      }
      entry.last_used = Utc::now();
      return Some(Arc::clone(&entry.payload));
    }

    match self.restore(&mut inner, route) {
      Some((payload, loaded)) => {
        if Self::expired_at(loaded, self.max_age) {
          self.remove_entry(&mut inner, route);
          None
        } else {
          Some(payload)
        }
      }
      None => None,
    }
  }

  /// Whether an unexpired entry exists in memory or the backing store.
  /// Observing an expired entry evicts it as a side effect.
  pub fn has(&self, route: Route) -> bool {
    let mut inner = self.lock();

    if let Some(entry) = inner.entries.get(&route) {
      if Self::expired_at(entry.last_loaded, self.max_age) {
        self.remove_entry(&mut inner, route);
        return false;
      }
      return true;
    }

    match self.backend.load_route(route) {
      Ok(Some(persisted)) => {
        if Self::expired_at(persisted.last_loaded, self.max_age) {
          self.backend_remove(route);
          false
        } else {
          true
        }
      }
      Ok(None) => false,
      Err(e) => {
        warn!("cache probe failed for {route}: {e}");
        false
      }
    }
  }

  /// Insert or replace the payload for `route`, returning the stored
  /// handle.
  ///
  /// Eviction runs before the new entry is counted against the byte
  /// budget and never selects the route being written. If the backing
  /// store rejects the write, one more entry is evicted and the write
  /// retried once; after that the entry stays memory-only.
  pub fn set(&self, route: Route, payload: Payload) -> Arc<Payload> {
    let payload = Arc::new(payload);
    let bytes = match serde_json::to_vec(payload.as_ref()) {
      Ok(bytes) => bytes,
      Err(e) => {
        warn!("failed to serialize payload for {route}: {e}");
        return payload;
      }
    };
    let size = bytes.len();
    let now = Utc::now();

    let mut inner = self.lock();

    if let Some(old) = inner.entries.remove(&route) {
      inner.total_bytes -= old.bytes;
    }
    self.evict_until_fits(&mut inner, size, route);

    inner.entries.insert(
      route,
      Entry {
        payload: Arc::clone(&payload),
        bytes: size,
        last_used: now,
        last_loaded: now,
      },
    );
    inner.total_bytes += size;

    let persisted = PersistedEntry {
      payload: bytes,
      last_used: now,
      last_loaded: now,
    };
    if self.backend.store_route(route, &persisted).is_err() {
      self.evict_one(&mut inner, route);
      if let Err(e) = self.backend.store_route(route, &persisted) {
        warn!("cache persistence dropped for {route}: {e}");
      }
    }

    payload
  }

  /// Remove one route's entry from both tiers.
  pub fn clear(&self, route: Route) {
    let mut inner = self.lock();
    self.remove_entry(&mut inner, route);
  }

  /// Remove every route entry from both tiers. Settings are unaffected.
  pub fn clear_all(&self) {
    let mut inner = self.lock();
    inner.entries.clear();
    inner.total_bytes = 0;
    if let Err(e) = self.backend.clear_routes() {
      warn!("failed to clear persisted cache: {e}");
    }
  }

  /// Total serialized bytes currently counted against the budget.
  #[allow(dead_code)]
  pub fn total_bytes(&self) -> usize {
    self.lock().total_bytes
  }

  #[allow(dead_code)]
  pub fn entry_count(&self) -> usize {
    self.lock().entries.len()
  }

  // Settings live in the durable namespace, unaffected by route-cache
  // lifecycle. All accessors swallow backend failures.

  pub fn setting(&self, key: &str) -> Option<String> {
    match self.backend.setting(key) {
      Ok(value) => value,
      Err(e) => {
        warn!("failed to read setting {key}: {e}");
        None
      }
    }
  }

  pub fn set_setting(&self, key: &str, value: &str) {
    if let Err(e) = self.backend.set_setting(key, value) {
      warn!("failed to store setting {key}: {e}");
    }
  }

  #[allow(dead_code)]
  pub fn remove_setting(&self, key: &str) {
    if let Err(e) = self.backend.remove_setting(key) {
      warn!("failed to remove setting {key}: {e}");
    }
  }

  #[allow(dead_code)]
  pub fn clear_settings(&self) {
    if let Err(e) = self.backend.clear_settings() {
      warn!("failed to clear settings: {e}");
    }
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    // A poisoned lock means a panic mid-mutation; the byte counter may
    // drift but serving the cache beats crashing the whole UI.
    self.inner.lock().unwrap_or_else(|p| p.into_inner())
  }

  /// Pull a payload out of the backing store into memory, bumping both
  /// timestamps. Unparseable rows are deleted and ignored.
  fn restore(&self, inner: &mut Inner, route: Route) -> Option<(Arc<Payload>, DateTime<Utc>)> {
    let persisted = match self.backend.load_route(route) {
      Ok(Some(p)) => p,
      Ok(None) => return None,
      Err(e) => {
        warn!("cache restore failed for {route}: {e}");
        return None;
      }
    };

    let payload: Payload = match serde_json::from_slice(&persisted.payload) {
      Ok(p) => p,
      Err(e) => {
        debug!("dropping unparseable cache row for {route}: {e}");
        self.backend_remove(route);
        return None;
      }
    };

    let loaded = persisted.last_loaded;
    let now = Utc::now();
    let size = persisted.payload.len();
    let payload = Arc::new(payload);

    self.evict_until_fits(inner, size, route);
    inner.entries.insert(
      route,
      Entry {
        payload: Arc::clone(&payload),
        bytes: size,
        last_used: now,
        last_loaded: now,
      },
    );
    inner.total_bytes += size;

    let bumped = PersistedEntry {
      payload: persisted.payload,
      last_used: now,
      last_loaded: now,
    };
    if let Err(e) = self.backend.store_route(route, &bumped) {
      debug!("failed to refresh persisted timestamps for {route}: {e}");
    }

    Some((payload, loaded))
  }

  /// Evict least-recently-used entries other than `protect` until the
  /// incoming size fits the budget or no candidates remain.
  fn evict_until_fits(&self, inner: &mut Inner, incoming: usize, protect: Route) {
    while inner.total_bytes + incoming > self.max_bytes {
      if !self.evict_one(inner, protect) {
        break;
      }
    }
  }

  /// Evict the single least-recently-used entry other than `protect`.
  /// Ties resolve by route declaration order. Returns false when no
  /// candidate exists.
  fn evict_one(&self, inner: &mut Inner, protect: Route) -> bool {
    let victim = inner
      .entries
      .iter()
      .filter(|(route, _)| **route != protect)
      .min_by_key(|(route, entry)| (entry.last_used, route_order(**route)))
      .map(|(route, _)| *route);

    match victim {
      Some(route) => {
        debug!("evicting {route} from route cache");
        self.remove_entry(inner, route);
        true
      }
      None => false,
    }
  }

  fn remove_entry(&self, inner: &mut Inner, route: Route) {
    if let Some(entry) = inner.entries.remove(&route) {
      inner.total_bytes -= entry.bytes;
    }
    self.backend_remove(route);
  }

  fn backend_remove(&self, route: Route) {
    if let Err(e) = self.backend.remove_route(route) {
      debug!("failed to delete persisted cache row for {route}: {e}");
    }
  }

  /// An entry is expired once the max age has fully elapsed.
  fn expired_at(last_loaded: DateTime<Utc>, max_age: Duration) -> bool {
    Utc::now() - last_loaded >= max_age
  }
}

fn route_order(route: Route) -> usize {
  ALL_ROUTES
    .iter()
    .position(|r| *r == route)
    .unwrap_or(ALL_ROUTES.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gallery::types::{History, HistoryEntry, MainFeed, ScreenshotGroup, Screenshots};
  use color_eyre::eyre::eyre;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn store_with(backend: Arc<dyn StorageBackend>, max_bytes: usize) -> Store {
    Store::new(backend, max_bytes, Duration::seconds(DEFAULT_MAX_AGE_SECS))
  }

  fn sqlite_backend() -> (tempfile::TempDir, Arc<SqliteStorage>) {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(SqliteStorage::open_at(&dir.path().join("cache.db")).unwrap());
    (dir, backend)
  }

  /// A payload whose serialized size is dominated by `padding` bytes.
  fn padded_payload(route: Route, padding: usize) -> Payload {
    match route {
      Route::Screenshots => Payload::Screenshots(Screenshots {
        groups: vec![ScreenshotGroup {
          title: "x".repeat(padding),
          images: vec![],
        }],
      }),
      Route::History => Payload::History(History {
        entries: vec![HistoryEntry {
          title: "y".repeat(padding),
          ..Default::default()
        }],
      }),
      _ => Payload::Main(MainFeed {
        profile: crate::gallery::types::Profile {
          bio: "z".repeat(padding),
          ..Default::default()
        },
        posts: vec![],
      }),
    }
  }

  #[test]
  fn test_set_then_get_roundtrips() {
    let store = store_with(Arc::new(NoopStorage), DEFAULT_MAX_BYTES);
    let payload = padded_payload(Route::Main, 32);

    store.set(Route::Main, payload.clone());
    assert_eq!(*store.get(Route::Main).unwrap(), payload);
    assert_eq!(*store.take_fresh(Route::Main).unwrap(), payload);
    assert!(store.has(Route::Main));
  }

  #[test]
  fn test_expired_entries_are_absent_and_evicted() {
    let store = Store::new(Arc::new(NoopStorage), DEFAULT_MAX_BYTES, Duration::zero());

    store.set(Route::Main, padded_payload(Route::Main, 8));
    assert!(!store.has(Route::Main));
    assert_eq!(store.entry_count(), 0);

    store.set(Route::Main, padded_payload(Route::Main, 8));
    assert!(store.take_fresh(Route::Main).is_none());
    assert_eq!(store.entry_count(), 0);
    assert_eq!(store.total_bytes(), 0);
  }

  #[test]
  fn test_lru_eviction_spares_recently_used() {
    // Budget fits two padded payloads but not three.
    let a = padded_payload(Route::Main, 400);
    let b = padded_payload(Route::Screenshots, 400);
    let c = padded_payload(Route::History, 400);
    let budget = serde_json::to_vec(&a).unwrap().len() * 2 + 100;
    let store = store_with(Arc::new(NoopStorage), budget);

    store.set(Route::Main, a.clone());
    store.set(Route::Screenshots, b);
    // Main is now the more recently used of the two.
    store.get(Route::Main).unwrap();

    store.set(Route::History, c);

    assert!(store.get(Route::Main).is_some());
    assert!(store.get(Route::Screenshots).is_none());
    assert!(store.get(Route::History).is_some());
    assert!(store.total_bytes() <= budget);
  }

  #[test]
  fn test_written_route_is_never_evicted_for_itself() {
    let small = padded_payload(Route::Main, 50);
    let store = store_with(Arc::new(NoopStorage), 200);

    store.set(Route::Main, small);
    // Far over budget on its own: everything else goes, the write stays.
    let huge = padded_payload(Route::Screenshots, 5_000);
    store.set(Route::Screenshots, huge.clone());

    assert_eq!(*store.get(Route::Screenshots).unwrap(), huge);
    assert!(store.get(Route::Main).is_none());
    assert_eq!(store.entry_count(), 1);
  }

  #[test]
  fn test_restore_from_backing_store() {
    let (_dir, backend) = sqlite_backend();
    let payload = padded_payload(Route::History, 16);

    let first = store_with(backend.clone(), DEFAULT_MAX_BYTES);
    first.set(Route::History, payload.clone());
    drop(first);

    // Fresh memory over the same backing store within the session.
    let second = store_with(backend, DEFAULT_MAX_BYTES);
    assert!(second.has(Route::History));
    assert_eq!(*second.get(Route::History).unwrap(), payload);
    // Mirrored back into memory.
    assert_eq!(second.entry_count(), 1);
  }

  #[test]
  fn test_clear_updates_byte_counter() {
    let store = store_with(Arc::new(NoopStorage), DEFAULT_MAX_BYTES);

    store.set(Route::Main, padded_payload(Route::Main, 100));
    store.set(Route::History, padded_payload(Route::History, 100));
    assert!(store.total_bytes() > 0);

    store.clear(Route::Main);
    assert_eq!(store.entry_count(), 1);

    store.clear_all();
    assert_eq!(store.entry_count(), 0);
    assert_eq!(store.total_bytes(), 0);
  }

  #[test]
  fn test_settings_survive_route_cache_lifecycle() {
    let (_dir, backend) = sqlite_backend();
    let store = store_with(backend, DEFAULT_MAX_BYTES);

    store.set_setting("last_route", "videos");
    store.set(Route::Main, padded_payload(Route::Main, 8));
    store.clear_all();

    assert_eq!(store.setting("last_route").as_deref(), Some("videos"));
    store.remove_setting("last_route");
    assert!(store.setting("last_route").is_none());
  }

  /// Backend whose route writes always fail, counting attempts.
  struct QuotaFailStorage {
    writes: AtomicUsize,
  }

  impl StorageBackend for QuotaFailStorage {
    fn load_route(&self, _route: Route) -> color_eyre::Result<Option<PersistedEntry>> {
      Ok(None)
    }
    fn store_route(&self, _route: Route, _entry: &PersistedEntry) -> color_eyre::Result<()> {
      self.writes.fetch_add(1, Ordering::SeqCst);
      Err(eyre!("quota exceeded"))
    }
    fn remove_route(&self, _route: Route) -> color_eyre::Result<()> {
      Ok(())
    }
    fn clear_routes(&self) -> color_eyre::Result<()> {
      Ok(())
    }
    fn setting(&self, _key: &str) -> color_eyre::Result<Option<String>> {
      Err(eyre!("unavailable"))
    }
    fn set_setting(&self, _key: &str, _value: &str) -> color_eyre::Result<()> {
      Err(eyre!("unavailable"))
    }
    fn remove_setting(&self, _key: &str) -> color_eyre::Result<()> {
      Err(eyre!("unavailable"))
    }
    fn clear_settings(&self) -> color_eyre::Result<()> {
      Err(eyre!("unavailable"))
    }
  }

  #[test]
  fn test_persistence_failure_degrades_to_memory_only() {
    let backend = Arc::new(QuotaFailStorage {
      writes: AtomicUsize::new(0),
    });
    let store = store_with(backend.clone(), DEFAULT_MAX_BYTES);
    let payload = padded_payload(Route::Main, 20);

    store.set(Route::Main, payload.clone());

    // One write, one retry, then silence. The in-memory entry survives.
    assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
    assert_eq!(*store.get(Route::Main).unwrap(), payload);

    // Settings failures are swallowed too.
    store.set_setting("k", "v");
    assert!(store.setting("k").is_none());
  }
}
