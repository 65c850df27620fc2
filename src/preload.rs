//! Best-effort media prefetching.
//!
//! After a section payload arrives from the network, its media URLs are
//! fetched in the background in small batches so the assets are warm by
//! the time the user opens them. Nothing here may block or fail a page
//! load: every fetch error is swallowed and every future resolves.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::gallery::media::MediaUrlSet;
use crate::gallery::types::Payload;

/// Known-URL memory per media kind.
const KNOWN_CAPACITY: usize = 100;

/// Pause between batches, standing in for idle-time scheduling.
const BATCH_DELAY: Duration = Duration::from_millis(50);

/// Bounded most-recently-seen URL set. Front is most recent; observing
/// past capacity drops the oldest.
#[derive(Debug)]
struct KnownSet {
  capacity: usize,
  order: VecDeque<String>,
}

impl KnownSet {
  fn new(capacity: usize) -> Self {
    Self {
      capacity,
      order: VecDeque::new(),
    }
  }

  fn contains(&self, url: &str) -> bool {
    self.order.iter().any(|u| u == url)
  }

  fn observe(&mut self, url: &str) {
    self.order.retain(|u| u != url);
    self.order.push_front(url.to_string());
    while self.order.len() > self.capacity {
      self.order.pop_back();
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
  Image,
  Video,
}

pub struct Preloader {
  http: reqwest::Client,
  base_url: Url,
  batch_size: usize,
  known_images: Mutex<KnownSet>,
  known_videos: Mutex<KnownSet>,
}

impl Preloader {
  pub fn new(http: reqwest::Client, base_url: Url, batch_size: usize) -> Self {
    Self {
      http,
      base_url,
      batch_size: batch_size.max(1),
      known_images: Mutex::new(KnownSet::new(KNOWN_CAPACITY)),
      known_videos: Mutex::new(KnownSet::new(KNOWN_CAPACITY)),
    }
  }

  /// Fetch one image unless it is already known; always resolves.
  pub async fn preload_image(&self, url: &str) {
    self.preload(MediaKind::Image, url).await;
  }

  /// Fetch one video unless it is already known; always resolves.
  pub async fn preload_video(&self, url: &str) {
    self.preload(MediaKind::Video, url).await;
  }

  /// Extract every media URL from `payload` and prefetch the unknown
  /// ones in fixed-size batches on a background task.
  pub fn preload_from(self: &Arc<Self>, payload: &Payload) {
    let set = MediaUrlSet::from_payload(payload);
    if set.is_empty() {
      return;
    }

    debug!(
      route = %payload.route(),
      images = set.images.len(),
      videos = set.videos.len(),
      "scheduling media prefetch"
    );

    let preloader = Arc::clone(self);
    tokio::spawn(async move {
      let tasks: Vec<(MediaKind, String)> = set
        .images
        .into_iter()
        .map(|u| (MediaKind::Image, u))
        .chain(set.videos.into_iter().map(|u| (MediaKind::Video, u)))
        .collect();

      for batch in tasks.chunks(preloader.batch_size) {
        futures::future::join_all(
          batch
            .iter()
            .map(|(kind, url)| preloader.preload(*kind, url)),
        )
        .await;
        tokio::time::sleep(BATCH_DELAY).await;
      }
    });
  }

  async fn preload(&self, kind: MediaKind, url: &str) {
    if url.is_empty() || self.is_known(kind, url) {
      return;
    }

    if let Err(e) = self.fetch_quietly(url).await {
      debug!("prefetch failed for {url}: {e}");
    }
    // Failures count as known too: a dead URL is not worth re-fetching
    // every time its payload is reloaded.
    self.mark_known(kind, url);
  }

  async fn fetch_quietly(&self, url: &str) -> Result<(), String> {
    let absolute = if url.starts_with("http://") || url.starts_with("https://") {
      Url::parse(url).map_err(|e| e.to_string())?
    } else {
      self.base_url.join(url).map_err(|e| e.to_string())?
    };

    let response = self
      .http
      .get(absolute)
      .send()
      .await
      .map_err(|e| e.to_string())?;
    // Drain the body so the bytes actually travel.
    response.bytes().await.map_err(|e| e.to_string())?;
    Ok(())
  }

  fn is_known(&self, kind: MediaKind, url: &str) -> bool {
    self.known(kind).lock().map(|s| s.contains(url)).unwrap_or(false)
  }

  fn mark_known(&self, kind: MediaKind, url: &str) {
    if let Ok(mut set) = self.known(kind).lock() {
      set.observe(url);
    }
  }

  fn known(&self, kind: MediaKind) -> &Mutex<KnownSet> {
    match kind {
      MediaKind::Image => &self.known_images,
      MediaKind::Video => &self.known_videos,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_known_set_evicts_oldest_past_capacity() {
    let mut set = KnownSet::new(3);
    set.observe("a");
    set.observe("b");
    set.observe("c");
    set.observe("d");

    assert!(!set.contains("a"));
    assert!(set.contains("b"));
    assert!(set.contains("d"));
  }

  #[test]
  fn test_known_set_observe_refreshes_position() {
    let mut set = KnownSet::new(3);
    set.observe("a");
    set.observe("b");
    set.observe("c");
    // Refresh "a" so "b" becomes the oldest.
    set.observe("a");
    set.observe("d");

    assert!(set.contains("a"));
    assert!(!set.contains("b"));
  }

  fn unreachable_preloader() -> Preloader {
    // Port 1 on loopback refuses immediately; fetches fail fast.
    Preloader::new(
      reqwest::Client::new(),
      Url::parse("http://127.0.0.1:1/").unwrap(),
      5,
    )
  }

  #[tokio::test]
  async fn test_preload_resolves_despite_fetch_failure() {
    let preloader = unreachable_preloader();

    preloader.preload_image("broken.jpg").await;
    assert!(preloader.is_known(MediaKind::Image, "broken.jpg"));
  }

  #[tokio::test]
  async fn test_known_urls_are_skipped() {
    let preloader = unreachable_preloader();

    preloader.mark_known(MediaKind::Video, "v.mp4");
    // Would hit the unreachable server if not skipped; either way it
    // must resolve, and the kinds keep separate sets.
    preloader.preload_video("v.mp4").await;
    assert!(!preloader.is_known(MediaKind::Image, "v.mp4"));
  }
}
