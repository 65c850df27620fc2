use serde::{Deserialize, Serialize};

use crate::routes::Route;

/// The site author's profile, shown in the feed header and on About.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub name: String,
  pub avatar: String,
  pub bio: String,
}

/// An embedded video: poster frame plus the playable file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
  pub thumbnail: String,
  pub url: String,
}

/// A feed post: one lead image, optional screenshot strip, optional video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub title: String,
  pub description: String,
  pub main_image: String,
  pub screenshots: Vec<String>,
  pub video: Option<Video>,
  pub tags: Vec<String>,
  pub date: String,
}

/// A curated collection of images with a cover.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
  pub title: String,
  pub description: String,
  pub cover: String,
  pub images: Vec<String>,
}

/// A titled group of screenshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotGroup {
  pub title: String,
  pub images: Vec<String>,
}

/// A standalone video entry on the Videos section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
  pub title: String,
  pub description: String,
  pub thumbnail: String,
  pub url: String,
  pub date: String,
}

/// A dated changelog entry on the History section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub date: String,
  pub title: String,
  pub notes: Vec<String>,
  pub image: Option<String>,
}

/// An outbound link on the About section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
  pub label: String,
  pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainFeed {
  pub profile: Profile,
  pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collections {
  pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenshots {
  pub groups: Vec<ScreenshotGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Videos {
  pub videos: Vec<VideoEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
  pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
  pub profile: Profile,
  pub skills: Vec<String>,
  pub links: Vec<Link>,
}

/// A validated section payload, one variant per route.
///
/// Stored in the route cache as serialized JSON; the `kind` tag keeps
/// restored rows self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
  Main(MainFeed),
  Collections(Collections),
  Screenshots(Screenshots),
  Videos(Videos),
  History(History),
  About(About),
}

impl Payload {
  /// The route this payload belongs to.
  pub fn route(&self) -> Route {
    match self {
      Payload::Main(_) => Route::Main,
      Payload::Collections(_) => Route::Collections,
      Payload::Screenshots(_) => Route::Screenshots,
      Payload::Videos(_) => Route::Videos,
      Payload::History(_) => Route::History,
      Payload::About(_) => Route::About,
    }
  }
}
