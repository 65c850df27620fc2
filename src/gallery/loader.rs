//! Store-first JSON loading with retry, backoff and cancellation.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::client::Fetch;
use super::error::{LoadError, LoadResult};
use super::types::Payload;
use super::validate::Validator;
use crate::preload::Preloader;
use crate::routes::Route;
use crate::store::Store;

/// Default number of fetch attempts per load.
pub const DEFAULT_RETRIES: u32 = 3;

/// Backoff unit; attempt N waits N times this before the next try.
const BACKOFF_UNIT: Duration = Duration::from_millis(1000);

/// Loads section payloads, consulting the Store before the network and
/// feeding the Preloader after genuine fetches.
pub struct DataLoader<F: Fetch> {
  fetch: Arc<F>,
  store: Arc<Store>,
  /// Optional by design: the app runs fine without prefetching.
  preloader: Option<Arc<Preloader>>,
  retries: u32,
}

impl<F: Fetch> Clone for DataLoader<F> {
  fn clone(&self) -> Self {
    Self {
      fetch: Arc::clone(&self.fetch),
      store: Arc::clone(&self.store),
      preloader: self.preloader.clone(),
      retries: self.retries,
    }
  }
}

impl<F: Fetch> DataLoader<F> {
  pub fn new(
    fetch: Arc<F>,
    store: Arc<Store>,
    preloader: Option<Arc<Preloader>>,
    retries: u32,
  ) -> Self {
    Self {
      fetch,
      store,
      preloader,
      retries: retries.max(1),
    }
  }

  /// Load the payload for `route`.
  ///
  /// Unless forcing, a fresh cache entry short-circuits the network
  /// entirely (and skips prefetching, which already ran when the entry
  /// was first fetched). Forcing clears the route's entry first and
  /// always hits the network with an extra cache-buster.
  pub async fn load(
    &self,
    route: Route,
    force_reload: bool,
    cancel: &CancellationToken,
  ) -> LoadResult<Arc<Payload>> {
    if cancel.is_cancelled() {
      return Err(LoadError::Cancelled);
    }

    if force_reload {
      self.store.clear(route);
    } else if let Some(payload) = self.store.take_fresh(route) {
      debug!("cache hit for {route}");
      return Ok(payload);
    }

    let mut attempt = 0;
    loop {
      attempt += 1;
      match self.fetch_once(route, force_reload, cancel).await {
        Ok(payload) => {
          let payload = self.store.set(route, payload);
          if let Some(preloader) = &self.preloader {
            preloader.preload_from(&payload);
          }
          return Ok(payload);
        }
        Err(e) if !e.is_retryable() => return Err(e),
        Err(e) if attempt < self.retries => {
          warn!("load attempt {attempt} for {route} failed: {e}");
          let backoff = BACKOFF_UNIT * attempt;
          tokio::select! {
            _ = cancel.cancelled() => return Err(LoadError::Cancelled),
            _ = tokio::time::sleep(backoff) => {}
          }
        }
        Err(e) => {
          warn!("giving up on {route} after {attempt} attempts: {e}");
          return Err(e);
        }
      }
    }
  }

  async fn fetch_once(
    &self,
    route: Route,
    force_reload: bool,
    cancel: &CancellationToken,
  ) -> LoadResult<Payload> {
    let raw = self
      .fetch
      .fetch_json(route.resource_path(), force_reload, cancel)
      .await?;

    let mut validator = Validator::new();
    let payload = validator
      .validate(route, &raw)
      .ok_or(LoadError::Validation)?;
    if validator.has_issues() {
      debug!(
        "{} payload normalized with {} issues: {:?}",
        route,
        validator.issues().len(),
        validator.issues()
      );
    }

    Ok(payload)
  }

  // Typed per-section entry points. Only Collections exposes forced
  // reload; the other sections always accept a fresh-enough cache.

  pub async fn load_main(&self, cancel: &CancellationToken) -> LoadResult<Arc<Payload>> {
    self.load(Route::Main, false, cancel).await
  }

  pub async fn load_collections(
    &self,
    force_reload: bool,
    cancel: &CancellationToken,
  ) -> LoadResult<Arc<Payload>> {
    self.load(Route::Collections, force_reload, cancel).await
  }

  pub async fn load_screenshots(&self, cancel: &CancellationToken) -> LoadResult<Arc<Payload>> {
    self.load(Route::Screenshots, false, cancel).await
  }

  pub async fn load_videos(&self, cancel: &CancellationToken) -> LoadResult<Arc<Payload>> {
    self.load(Route::Videos, false, cancel).await
  }

  pub async fn load_history(&self, cancel: &CancellationToken) -> LoadResult<Arc<Payload>> {
    self.load(Route::History, false, cancel).await
  }

  pub async fn load_about(&self, cancel: &CancellationToken) -> LoadResult<Arc<Payload>> {
    self.load(Route::About, false, cancel).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::NoopStorage;
  use async_trait::async_trait;
  use chrono::Duration as ChronoDuration;
  use serde_json::{json, Value};
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  /// Scripted fetcher: pops one response per call and records the
  /// force flag it saw.
  struct MockFetch {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<LoadResult<Value>>>,
    forces: Mutex<Vec<bool>>,
  }

  impl MockFetch {
    fn new(responses: Vec<LoadResult<Value>>) -> Arc<Self> {
      Arc::new(Self {
        calls: AtomicUsize::new(0),
        responses: Mutex::new(responses.into()),
        forces: Mutex::new(Vec::new()),
      })
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl Fetch for MockFetch {
    async fn fetch_json(
      &self,
      _path: &str,
      force_reload: bool,
      _cancel: &CancellationToken,
    ) -> LoadResult<Value> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.forces.lock().unwrap().push(force_reload);
      self
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(LoadError::Network("script exhausted".into())))
    }
  }

  fn fresh_store() -> Arc<Store> {
    Arc::new(Store::new(
      Arc::new(NoopStorage),
      crate::store::DEFAULT_MAX_BYTES,
      ChronoDuration::seconds(crate::store::DEFAULT_MAX_AGE_SECS),
    ))
  }

  fn loader(fetch: Arc<MockFetch>, store: Arc<Store>) -> DataLoader<MockFetch> {
    DataLoader::new(fetch, store, None, DEFAULT_RETRIES)
  }

  fn main_json() -> Value {
    json!({
      "profile": {"name": "Ada", "avatar": "me.png", "bio": "hi"},
      "posts": []
    })
  }

  fn collections_json(title: &str) -> Value {
    json!({
      "collections": [
        {"title": title, "description": "", "cover": "c.jpg", "images": []}
      ]
    })
  }

  #[tokio::test]
  async fn test_second_load_within_ttl_hits_cache() {
    let fetch = MockFetch::new(vec![Ok(main_json())]);
    let loader = loader(fetch.clone(), fresh_store());
    let cancel = CancellationToken::new();

    let first = loader.load_main(&cancel).await.unwrap();
    let second = loader.load_main(&cancel).await.unwrap();

    assert_eq!(fetch.calls(), 1);
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn test_pre_cancelled_load_touches_nothing() {
    let fetch = MockFetch::new(vec![Ok(main_json())]);
    let store = fresh_store();
    let loader = loader(fetch.clone(), store.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = loader.load_main(&cancel).await;

    assert!(matches!(result, Err(LoadError::Cancelled)));
    assert_eq!(fetch.calls(), 0);
    assert_eq!(store.entry_count(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_retries_back_off_linearly() {
    let fetch = MockFetch::new(vec![
      Err(LoadError::Http(500)),
      Err(LoadError::Network("reset".into())),
      Ok(main_json()),
    ]);
    let loader = loader(fetch.clone(), fresh_store());
    let cancel = CancellationToken::new();

    let started = tokio::time::Instant::now();
    let result = loader.load_main(&cancel).await;

    assert!(result.is_ok());
    assert_eq!(fetch.calls(), 3);
    // 1000ms after the first failure, 2000ms after the second.
    let waited = started.elapsed();
    assert!(waited >= Duration::from_millis(3000), "{waited:?}");
    assert!(waited < Duration::from_millis(3500), "{waited:?}");
  }

  #[tokio::test(start_paused = true)]
  async fn test_gives_up_after_configured_attempts() {
    let fetch = MockFetch::new(vec![
      Err(LoadError::Http(500)),
      Err(LoadError::Http(502)),
      Err(LoadError::Http(503)),
    ]);
    let store = fresh_store();
    let loader = loader(fetch.clone(), store.clone());
    let cancel = CancellationToken::new();

    let result = loader.load_main(&cancel).await;

    assert!(matches!(result, Err(LoadError::Http(503))));
    assert_eq!(fetch.calls(), 3);
    assert_eq!(store.entry_count(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_cancellation_during_backoff_stops_retrying() {
    let fetch = MockFetch::new(vec![Err(LoadError::Http(500)), Ok(main_json())]);
    let store = fresh_store();
    let loader = loader(fetch.clone(), store.clone());
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
      // Fires inside the first 1000ms backoff window.
      tokio::time::sleep(Duration::from_millis(500)).await;
      canceller.cancel();
    });

    let result = loader.load_main(&cancel).await;

    assert!(matches!(result, Err(LoadError::Cancelled)));
    assert_eq!(fetch.calls(), 1);
    assert_eq!(store.entry_count(), 0);
  }

  #[tokio::test]
  async fn test_cancelled_fetch_is_never_retried() {
    let fetch = MockFetch::new(vec![Err(LoadError::Cancelled), Ok(main_json())]);
    let store = fresh_store();
    let loader = loader(fetch.clone(), store.clone());
    let cancel = CancellationToken::new();

    let result = loader.load_main(&cancel).await;

    assert!(matches!(result, Err(LoadError::Cancelled)));
    assert_eq!(fetch.calls(), 1);
    assert_eq!(store.entry_count(), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_validation_failure_is_retried_like_a_load_failure() {
    // Top-level arrays fail validation outright.
    let fetch = MockFetch::new(vec![Ok(json!([1, 2, 3])), Ok(main_json())]);
    let loader = loader(fetch.clone(), fresh_store());
    let cancel = CancellationToken::new();

    let result = loader.load_main(&cancel).await;

    assert!(result.is_ok());
    assert_eq!(fetch.calls(), 2);
  }

  #[tokio::test]
  async fn test_force_reload_bypasses_cache_and_flags_fetch() {
    let fetch = MockFetch::new(vec![
      Ok(collections_json("old")),
      Ok(collections_json("new")),
    ]);
    let store = fresh_store();
    let loader = loader(fetch.clone(), store.clone());
    let cancel = CancellationToken::new();

    loader.load_collections(false, &cancel).await.unwrap();
    let reloaded = loader.load_collections(true, &cancel).await.unwrap();

    assert_eq!(fetch.calls(), 2);
    assert_eq!(*fetch.forces.lock().unwrap(), vec![false, true]);
    let Payload::Collections(c) = reloaded.as_ref() else {
      panic!("wrong variant");
    };
    assert_eq!(c.collections[0].title, "new");
  }
}
