//! Defensive normalization of raw section JSON into typed payloads.
//!
//! The site's JSON is hand-maintained, so the validator never rejects a
//! payload outright for a bad field: missing or mistyped values are
//! replaced with defaults and recorded as issues, and array entries that
//! are not objects are dropped. Only a top-level value that is not an
//! object at all fails validation.

use serde_json::Value;

use super::types::{
  About, Collection, Collections, History, HistoryEntry, Link, MainFeed, Payload, Post, Profile,
  ScreenshotGroup, Screenshots, Video, VideoEntry, Videos,
};
use crate::routes::Route;

/// Walks raw JSON and accumulates human-readable issues while producing
/// a best-effort typed payload.
#[derive(Debug, Default)]
pub struct Validator {
  issues: Vec<String>,
}

impl Validator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Issues recorded across all validations run on this instance.
  pub fn issues(&self) -> &[String] {
    &self.issues
  }

  pub fn has_issues(&self) -> bool {
    !self.issues.is_empty()
  }

  /// Validate a raw value as the payload for `route`.
  ///
  /// Returns `None` only when the top-level value is not an object.
  pub fn validate(&mut self, route: Route, value: &Value) -> Option<Payload> {
    if !value.is_object() {
      self
        .issues
        .push(format!("{route}: top-level payload is not an object"));
      return None;
    }

    Some(match route {
      Route::Main => Payload::Main(MainFeed {
        profile: self.profile(value.get("profile"), "profile"),
        posts: self.object_array(value, "posts", Self::post),
      }),
      Route::Collections => Payload::Collections(Collections {
        collections: self.object_array(value, "collections", Self::collection),
      }),
      Route::Screenshots => Payload::Screenshots(Screenshots {
        groups: self.object_array(value, "groups", Self::screenshot_group),
      }),
      Route::Videos => Payload::Videos(Videos {
        videos: self.object_array(value, "videos", Self::video_entry),
      }),
      Route::History => Payload::History(History {
        entries: self.object_array(value, "entries", Self::history_entry),
      }),
      Route::About => Payload::About(About {
        profile: self.profile(value.get("profile"), "profile"),
        skills: self.string_array(value, "skills"),
        links: self.object_array(value, "links", Self::link),
      }),
    })
  }

  fn profile(&mut self, value: Option<&Value>, ctx: &str) -> Profile {
    let Some(obj) = value.filter(|v| v.is_object()) else {
      self.issues.push(format!("{ctx}: missing or not an object"));
      return Profile::default();
    };
    Profile {
      name: self.required_string(obj, "name", ctx),
      avatar: self.required_string(obj, "avatar", ctx),
      bio: self.required_string(obj, "bio", ctx),
    }
  }

  fn post(&mut self, obj: &Value, ctx: &str) -> Post {
    Post {
      title: self.required_string(obj, "title", ctx),
      description: self.required_string(obj, "description", ctx),
      main_image: self.required_string(obj, "mainImage", ctx),
      screenshots: self.string_array(obj, "screenshots"),
      video: self.video(obj.get("video"), ctx),
      tags: self.string_array(obj, "tags"),
      date: self.required_string(obj, "date", ctx),
    }
  }

  fn video(&mut self, value: Option<&Value>, ctx: &str) -> Option<Video> {
    let value = value?;
    if value.is_null() {
      return None;
    }
    if !value.is_object() {
      self.issues.push(format!("{ctx}.video: not an object"));
      return None;
    }
    Some(Video {
      thumbnail: self.required_string(value, "thumbnail", ctx),
      url: self.required_string(value, "url", ctx),
    })
  }

  fn collection(&mut self, obj: &Value, ctx: &str) -> Collection {
    Collection {
      title: self.required_string(obj, "title", ctx),
      description: self.required_string(obj, "description", ctx),
      cover: self.required_string(obj, "cover", ctx),
      images: self.string_array(obj, "images"),
    }
  }

  fn screenshot_group(&mut self, obj: &Value, ctx: &str) -> ScreenshotGroup {
    ScreenshotGroup {
      title: self.required_string(obj, "title", ctx),
      images: self.string_array(obj, "images"),
    }
  }

  fn video_entry(&mut self, obj: &Value, ctx: &str) -> VideoEntry {
    VideoEntry {
      title: self.required_string(obj, "title", ctx),
      description: self.required_string(obj, "description", ctx),
      thumbnail: self.required_string(obj, "thumbnail", ctx),
      url: self.required_string(obj, "url", ctx),
      date: self.required_string(obj, "date", ctx),
    }
  }

  fn history_entry(&mut self, obj: &Value, ctx: &str) -> HistoryEntry {
    HistoryEntry {
      date: self.required_string(obj, "date", ctx),
      title: self.required_string(obj, "title", ctx),
      notes: self.string_array(obj, "notes"),
      image: self.optional_string(obj, "image", ctx),
    }
  }

  fn link(&mut self, obj: &Value, ctx: &str) -> Link {
    Link {
      label: self.required_string(obj, "label", ctx),
      url: self.required_string(obj, "url", ctx),
    }
  }

  /// A field that must be present: absence records an issue and yields
  /// the empty string; a wrong-typed value records an issue and is
  /// coerced where possible.
  fn required_string(&mut self, obj: &Value, key: &str, ctx: &str) -> String {
    match obj.get(key) {
      None | Some(Value::Null) => {
        self.issues.push(format!("{ctx}.{key}: missing"));
        String::new()
      }
      Some(Value::String(s)) => s.clone(),
      Some(v) => match self.coerce_string(v) {
        Some(coerced) => {
          self
            .issues
            .push(format!("{ctx}.{key}: not a string, coerced"));
          coerced
        }
        None => {
          self.issues.push(format!("{ctx}.{key}: expected a string"));
          String::new()
        }
      },
    }
  }

  /// A field that may be absent; a present but wrong-typed value still
  /// records an issue.
  fn optional_string(&mut self, obj: &Value, key: &str, ctx: &str) -> Option<String> {
    match obj.get(key) {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) => Some(s.clone()),
      Some(v) => {
        let coerced = self.coerce_string(v);
        self.issues.push(match &coerced {
          Some(_) => format!("{ctx}.{key}: not a string, coerced"),
          None => format!("{ctx}.{key}: expected a string"),
        });
        coerced
      }
    }
  }

  /// An array of strings; a missing or non-array value yields empty, and
  /// entries that cannot coerce to a string are dropped.
  fn string_array(&mut self, obj: &Value, key: &str) -> Vec<String> {
    let Some(value) = obj.get(key) else {
      return Vec::new();
    };
    let Some(items) = value.as_array() else {
      self.issues.push(format!("{key}: expected an array"));
      return Vec::new();
    };
    items
      .iter()
      .enumerate()
      .filter_map(|(i, v)| {
        let coerced = self.coerce_string(v);
        if coerced.is_none() {
          self.issues.push(format!("{key}[{i}]: not a string, dropped"));
        }
        coerced
      })
      .collect()
  }

  /// An array of objects parsed by `parse`; non-object entries are
  /// dropped rather than failing the payload.
  fn object_array<T>(
    &mut self,
    obj: &Value,
    key: &str,
    parse: fn(&mut Self, &Value, &str) -> T,
  ) -> Vec<T> {
    let Some(value) = obj.get(key) else {
      self.issues.push(format!("{key}: missing"));
      return Vec::new();
    };
    let Some(items) = value.as_array() else {
      self.issues.push(format!("{key}: expected an array"));
      return Vec::new();
    };
    items
      .iter()
      .enumerate()
      .filter_map(|(i, v)| {
        if v.is_object() {
          Some(parse(self, v, &format!("{key}[{i}]")))
        } else {
          self
            .issues
            .push(format!("{key}[{i}]: not an object, dropped"));
          None
        }
      })
      .collect()
  }

  /// Strings pass through; numbers and booleans coerce via display.
  fn coerce_string(&self, value: &Value) -> Option<String> {
    match value {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      Value::Bool(b) => Some(b.to_string()),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_valid_main_payload_has_no_issues() {
    let raw = json!({
      "profile": {"name": "Ada", "avatar": "me.png", "bio": "hi"},
      "posts": [{
        "title": "First",
        "description": "d",
        "mainImage": "a.jpg",
        "screenshots": ["b.jpg"],
        "video": {"thumbnail": "c.jpg", "url": "d.mp4"},
        "tags": ["tui"],
        "date": "2026-01-01"
      }]
    });

    let mut validator = Validator::new();
    let payload = validator.validate(Route::Main, &raw).unwrap();
    assert!(!validator.has_issues(), "{:?}", validator.issues());

    let Payload::Main(feed) = payload else {
      panic!("wrong variant");
    };
    assert_eq!(feed.profile.name, "Ada");
    assert_eq!(feed.posts[0].main_image, "a.jpg");
    assert_eq!(feed.posts[0].video.as_ref().unwrap().url, "d.mp4");
  }

  #[test]
  fn test_missing_required_field_defaults_and_records_issue() {
    let raw = json!({
      "profile": {"name": "Ada", "avatar": "me.png", "bio": "hi"},
      "posts": [{"description": "d", "mainImage": "a.jpg", "date": "x"}]
    });

    let mut validator = Validator::new();
    let Some(Payload::Main(feed)) = validator.validate(Route::Main, &raw) else {
      panic!("expected payload");
    };
    assert_eq!(feed.posts[0].title, "");
    assert!(validator.has_issues());
    assert!(validator.issues().iter().any(|i| i.contains("title")));
  }

  #[test]
  fn test_mistyped_field_is_coerced() {
    let raw = json!({
      "entries": [{"date": 20260101, "title": "Launch", "notes": []}]
    });

    let mut validator = Validator::new();
    let Some(Payload::History(history)) = validator.validate(Route::History, &raw) else {
      panic!("expected payload");
    };
    assert_eq!(history.entries[0].date, "20260101");
    assert!(validator.issues().iter().any(|i| i.contains("coerced")));
  }

  #[test]
  fn test_non_object_array_entries_are_dropped() {
    let raw = json!({
      "collections": [
        {"title": "A", "description": "", "cover": "a.jpg", "images": []},
        "not-a-collection",
        42
      ]
    });

    let mut validator = Validator::new();
    let Some(Payload::Collections(c)) = validator.validate(Route::Collections, &raw) else {
      panic!("expected payload");
    };
    assert_eq!(c.collections.len(), 1);
    assert!(validator.has_issues());
  }

  #[test]
  fn test_non_string_array_entries_are_dropped() {
    let raw = json!({
      "groups": [{"title": "G", "images": ["a.jpg", {"nested": true}, "b.jpg"]}]
    });

    let mut validator = Validator::new();
    let Some(Payload::Screenshots(s)) = validator.validate(Route::Screenshots, &raw) else {
      panic!("expected payload");
    };
    assert_eq!(s.groups[0].images, vec!["a.jpg", "b.jpg"]);
  }

  #[test]
  fn test_top_level_non_object_fails() {
    let mut validator = Validator::new();
    assert!(validator.validate(Route::Videos, &json!([1, 2, 3])).is_none());
    assert!(validator.validate(Route::Videos, &json!("nope")).is_none());
    assert!(validator.has_issues());
  }

  #[test]
  fn test_null_video_is_absent_without_issue() {
    let raw = json!({
      "profile": {"name": "A", "avatar": "a", "bio": "b"},
      "posts": [{
        "title": "t", "description": "d", "mainImage": "m.jpg",
        "video": null, "date": "2026-01-01"
      }]
    });

    let mut validator = Validator::new();
    let Some(Payload::Main(feed)) = validator.validate(Route::Main, &raw) else {
      panic!("expected payload");
    };
    assert!(feed.posts[0].video.is_none());
    assert!(!validator.has_issues(), "{:?}", validator.issues());
  }
}
