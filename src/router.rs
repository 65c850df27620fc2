//! Route state machine with cancellation of superseded loads.

use tokio_util::sync::CancellationToken;

use crate::routes::Route;

/// Everything a page-load task needs: which route, the generation that
/// identifies this navigation, and the token that cancels it.
#[derive(Debug, Clone)]
pub struct LoadTicket {
  pub route: Route,
  pub generation: u64,
  pub cancel: CancellationToken,
}

/// Tracks the current route and arbitrates competing loads.
///
/// Every navigation cancels the previous load's token and mints a fresh
/// one together with a monotonically increasing generation. A result
/// arriving with a stale generation belongs to a superseded navigation
/// and must be discarded by the caller.
#[derive(Debug)]
pub struct Router {
  current: Option<Route>,
  generation: u64,
  cancel: CancellationToken,
}

impl Default for Router {
  fn default() -> Self {
    Self::new()
  }
}

impl Router {
  pub fn new() -> Self {
    Self {
      current: None,
      generation: 0,
      cancel: CancellationToken::new(),
    }
  }

  /// The current route, or `None` before the first navigation.
  pub fn current(&self) -> Option<Route> {
    self.current
  }

  /// Transition to `route`: cancel the in-flight load and hand out a
  /// ticket for the new one.
  pub fn navigate(&mut self, route: Route) -> LoadTicket {
    self.cancel.cancel();
    self.cancel = CancellationToken::new();
    self.generation += 1;
    self.current = Some(route);

    LoadTicket {
      route,
      generation: self.generation,
      cancel: self.cancel.clone(),
    }
  }

  /// Whether a result tagged with `generation` is still the current one.
  pub fn is_current(&self, generation: u64) -> bool {
    self.generation == generation
  }

  /// Cancel whatever load is in flight, e.g. on shutdown.
  pub fn cancel_active(&mut self) {
    self.cancel.cancel();
  }
}
