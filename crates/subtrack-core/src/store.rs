//! The `SubscriptionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `subtrack-store-sqlite`
//! and the in-memory [`MemoryStore`](crate::memory::MemoryStore)). Higher
//! layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{month::Month, subscription::Subscription};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`SubscriptionStore::sum_for_period`].
///
/// Build with [`PeriodQuery::starting`]; the `with_*` setters normalise empty
/// filters to `None`, which means "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodQuery {
  pub user_id:      Option<Uuid>,
  pub service_name: Option<String>,
  pub start:        Month,
  /// `None` leaves the window open towards the future.
  pub end:          Option<Month>,
}

impl PeriodQuery {
  pub fn starting(start: Month) -> Self {
    Self { user_id: None, service_name: None, start, end: None }
  }

  pub fn with_end(mut self, end: Option<Month>) -> Self {
    self.end = end;
    self
  }

  pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
    self.user_id = user_id.filter(|id| !id.is_nil());
    self
  }

  pub fn with_service(mut self, service_name: Option<String>) -> Self {
    self.service_name = service_name.filter(|s| !s.is_empty());
    self
  }

  /// Whether `sub` passes the filters and its period overlaps the window.
  pub fn matches(&self, sub: &Subscription) -> bool {
    self.user_id.is_none_or(|id| sub.user_id == id)
      && self
        .service_name
        .as_deref()
        .is_none_or(|name| sub.service_name == name)
      && sub.overlaps(self.start, self.end)
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors must say whether they mean "no such row" so callers can
/// tell a missing subscription apart from an execution failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_not_found(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a subscription store backend.
///
/// Every method is a single round trip to the backend with no retry. All
/// methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: StoreError;

  /// Persist a new subscription. The id is assigned by the caller and
  /// returned unchanged.
  fn create<'a>(
    &'a self,
    subscription: &'a Subscription,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + 'a;

  /// Retrieve a subscription by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Overwrite the mutable columns (`service_name`, `price`, `start_date`,
  /// `end_date`, `updated_at`) of the row with `subscription.id`.
  ///
  /// Fails with a not-found error if no row has that id.
  fn update<'a>(
    &'a self,
    subscription: &'a Subscription,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Hard-delete a subscription. Fails with a not-found error if no row has
  /// that id.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All subscriptions of `user_id` (or of everyone if `None`), newest
  /// `created_at` first.
  fn list(
    &self,
    user_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Sum of `price` over every subscription matching `query`. Each match
  /// counts its full price regardless of how much of the window it covers.
  fn sum_for_period<'a>(
    &'a self,
    query: &'a PeriodQuery,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;
}
