//! HTTP access to the site's JSON resources.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::{LoadError, LoadResult};

/// Capability seam for fetching raw section JSON.
///
/// The DataLoader is generic over this so its retry, cancellation and
/// caching behavior can be exercised without a server.
#[async_trait]
pub trait Fetch: Send + Sync {
  /// GET the JSON resource at `path` (relative to the site base URL).
  /// `force_reload` adds the timestamp cache-buster on top of the
  /// static version token.
  async fn fetch_json(
    &self,
    path: &str,
    force_reload: bool,
    cancel: &CancellationToken,
  ) -> LoadResult<Value>;
}

/// reqwest-backed site client.
#[derive(Clone)]
pub struct GalleryClient {
  http: reqwest::Client,
  base_url: Url,
  version_token: String,
}

impl GalleryClient {
  pub fn new(base_url: &str, version_token: &str) -> color_eyre::Result<Self> {
    use color_eyre::eyre::eyre;

    let base_url = Url::parse(base_url).map_err(|e| eyre!("Invalid base URL {base_url}: {e}"))?;
    let http = reqwest::Client::builder()
      .timeout(std::time::Duration::from_secs(30))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {e}"))?;

    Ok(Self {
      http,
      base_url,
      version_token: version_token.to_string(),
    })
  }

  /// Resource URL with cache-busting query parameters: the static
  /// version token always, a millisecond timestamp when forcing.
  fn resource_url(&self, path: &str, force_reload: bool) -> LoadResult<Url> {
    let mut url = self
      .base_url
      .join(path)
      .map_err(|e| LoadError::Network(format!("bad resource path {path}: {e}")))?;

    {
      let mut pairs = url.query_pairs_mut();
      pairs.append_pair("v", &self.version_token);
      if force_reload {
        pairs.append_pair("t", &Utc::now().timestamp_millis().to_string());
      }
    }

    Ok(url)
  }
}

#[async_trait]
impl Fetch for GalleryClient {
  async fn fetch_json(
    &self,
    path: &str,
    force_reload: bool,
    cancel: &CancellationToken,
  ) -> LoadResult<Value> {
    if cancel.is_cancelled() {
      return Err(LoadError::Cancelled);
    }

    let url = self.resource_url(path, force_reload)?;
    let request = self.http.get(url).header(CACHE_CONTROL, "no-cache");

    let response = tokio::select! {
      _ = cancel.cancelled() => return Err(LoadError::Cancelled),
      result = request.send() => result.map_err(|e| LoadError::Network(e.to_string()))?,
    };

    let status = response.status();
    if !status.is_success() {
      return Err(LoadError::Http(status.as_u16()));
    }

    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .unwrap_or("")
      .to_string();
    if !content_type.contains("application/json") {
      return Err(LoadError::ContentType(content_type));
    }

    let body = tokio::select! {
      _ = cancel.cancelled() => return Err(LoadError::Cancelled),
      result = response.bytes() => result.map_err(|e| LoadError::Network(e.to_string()))?,
    };

    serde_json::from_slice(&body).map_err(|e| LoadError::Json(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client() -> GalleryClient {
    GalleryClient::new("https://gallery.example/", "7").unwrap()
  }

  #[test]
  fn test_resource_url_carries_version_token() {
    let url = client().resource_url("data/main.json", false).unwrap();
    assert_eq!(url.path(), "/data/main.json");
    assert_eq!(url.query(), Some("v=7"));
  }

  #[test]
  fn test_force_reload_appends_timestamp() {
    let url = client().resource_url("data/collections.json", true).unwrap();
    let query = url.query().unwrap();
    assert!(query.starts_with("v=7&t="));
    let t: i64 = query.rsplit('=').next().unwrap().parse().unwrap();
    assert!(t > 0);
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    assert!(GalleryClient::new("not a url", "1").is_err());
  }

  #[tokio::test]
  async fn test_pre_cancelled_fetch_short_circuits() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client().fetch_json("data/main.json", false, &cancel).await;
    assert!(matches!(result, Err(LoadError::Cancelled)));
  }
}
