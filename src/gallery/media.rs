//! Media URL extraction for prefetching.

use std::collections::HashSet;

use super::types::Payload;

/// Every image and video URL reachable from a payload, in encounter
/// order with duplicates removed. Derived on demand, never persisted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MediaUrlSet {
  pub images: Vec<String>,
  pub videos: Vec<String>,
}

impl MediaUrlSet {
  pub fn from_payload(payload: &Payload) -> Self {
    let mut set = Collector::default();

    match payload {
      Payload::Main(feed) => {
        set.image(&feed.profile.avatar);
        for post in &feed.posts {
          set.image(&post.main_image);
          for shot in &post.screenshots {
            set.image(shot);
          }
          if let Some(video) = &post.video {
            set.image(&video.thumbnail);
            set.video(&video.url);
          }
        }
      }
      Payload::Collections(c) => {
        for collection in &c.collections {
          set.image(&collection.cover);
          for image in &collection.images {
            set.image(image);
          }
        }
      }
      Payload::Screenshots(s) => {
        for group in &s.groups {
          for image in &group.images {
            set.image(image);
          }
        }
      }
      Payload::Videos(v) => {
        for entry in &v.videos {
          set.image(&entry.thumbnail);
          set.video(&entry.url);
        }
      }
      Payload::History(h) => {
        for entry in &h.entries {
          if let Some(image) = &entry.image {
            set.image(image);
          }
        }
      }
      Payload::About(a) => {
        set.image(&a.profile.avatar);
      }
    }

    set.finish()
  }

  pub fn is_empty(&self) -> bool {
    self.images.is_empty() && self.videos.is_empty()
  }
}

/// Order-preserving deduplicating accumulator.
#[derive(Default)]
struct Collector {
  images: Vec<String>,
  videos: Vec<String>,
  seen: HashSet<String>,
}

impl Collector {
  fn image(&mut self, url: &str) {
    if !url.is_empty() && self.seen.insert(url.to_string()) {
      self.images.push(url.to_string());
    }
  }

  fn video(&mut self, url: &str) {
    if !url.is_empty() && self.seen.insert(url.to_string()) {
      self.videos.push(url.to_string());
    }
  }

  fn finish(self) -> MediaUrlSet {
    MediaUrlSet {
      images: self.images,
      videos: self.videos,
    }
  }
}
