//! The six content sections and how URL fragments map onto them.

use serde::{Deserialize, Serialize};

/// A content section of the portfolio site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
  Main,
  Collections,
  Screenshots,
  Videos,
  History,
  About,
}

/// All routes in declaration order. Eviction ties resolve in this order.
pub const ALL_ROUTES: [Route; 6] = [
  Route::Main,
  Route::Collections,
  Route::Screenshots,
  Route::Videos,
  Route::History,
  Route::About,
];

impl Route {
  /// Canonical lowercase name, used as the fragment value and cache key.
  pub fn name(self) -> &'static str {
    match self {
      Route::Main => "main",
      Route::Collections => "collections",
      Route::Screenshots => "screenshots",
      Route::Videos => "videos",
      Route::History => "history",
      Route::About => "about",
    }
  }

  /// Display title for the header and breadcrumb.
  pub fn title(self) -> &'static str {
    match self {
      Route::Main => "Feed",
      Route::Collections => "Collections",
      Route::Screenshots => "Screenshots",
      Route::Videos => "Videos",
      Route::History => "History",
      Route::About => "About",
    }
  }

  /// JSON resource path relative to the site base URL.
  pub fn resource_path(self) -> &'static str {
    match self {
      Route::Main => "data/main.json",
      Route::Collections => "data/collections.json",
      Route::Screenshots => "data/screenshots.json",
      Route::Videos => "data/videos.json",
      Route::History => "data/history.json",
      Route::About => "data/about.json",
    }
  }

  /// Whether the section honors a caller-requested force reload.
  /// Collections is the only section whose upstream data churns enough
  /// to warrant bypassing the cache on demand.
  pub fn supports_force_reload(self) -> bool {
    matches!(self, Route::Collections)
  }

  /// Parse a site fragment (`#/videos`, `videos`) into a route.
  ///
  /// The `#/` prefix is stripped if present; the remainder is matched
  /// case-sensitively against the route table. Anything unrecognized,
  /// including the empty fragment, falls back to `Main`.
  pub fn parse_fragment(fragment: &str) -> Route {
    let name = fragment.strip_prefix("#/").unwrap_or(fragment);
    ALL_ROUTES
      .into_iter()
      .find(|r| r.name() == name)
      .unwrap_or(Route::Main)
  }
}

impl std::fmt::Display for Route {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}
