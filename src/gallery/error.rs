//! Load-failure taxonomy for the data layer.
//!
//! Cancellation must stay distinguishable from transient failure: a
//! cancelled load is silently discarded, everything else either retries
//! or surfaces as a generic error panel.

use thiserror::Error;

/// Errors produced while loading a section payload.
#[derive(Error, Debug)]
pub enum LoadError {
  /// The load was cancelled by navigation. Never user-visible.
  #[error("load cancelled")]
  Cancelled,

  /// The server answered with a non-success status.
  #[error("unexpected HTTP status {0}")]
  Http(u16),

  /// The response did not declare a JSON content type.
  #[error("response is not JSON (content-type: {0})")]
  ContentType(String),

  /// The body failed to parse as JSON.
  #[error("invalid JSON: {0}")]
  Json(String),

  /// The payload did not have the expected top-level shape.
  #[error("payload failed validation")]
  Validation,

  /// Connection, DNS, timeout and similar transport failures.
  #[error("network error: {0}")]
  Network(String),
}

impl LoadError {
  /// Whether the loader may retry after this error.
  pub fn is_retryable(&self) -> bool {
    !matches!(self, LoadError::Cancelled)
  }
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cancellation_is_not_retryable() {
    assert!(!LoadError::Cancelled.is_retryable());
    assert!(LoadError::Http(500).is_retryable());
    assert!(LoadError::Validation.is_retryable());
    assert!(LoadError::Network("refused".into()).is_retryable());
  }
}
