//! JSON REST API for subtrack.
//!
//! Exposes an axum [`Router`] backed by any
//! [`subtrack_core::store::SubscriptionStore`]. Transport concerns (timeouts,
//! request ids, tracing) are layered on by the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", subtrack_api::api_router(store.clone()))
//! ```

pub mod dto;
pub mod error;
pub mod subscriptions;
pub mod usecase;

use std::sync::Arc;

use axum::{Router, routing::get};
use subtrack_core::store::SubscriptionStore;

pub use error::ApiError;
pub use usecase::SubscriptionUsecase;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>).post(subscriptions::create::<S>),
    )
    .route("/subscriptions/summary", get(subscriptions::summary::<S>))
    .route(
      "/subscriptions/{id}",
      get(subscriptions::get_one::<S>)
        .put(subscriptions::update::<S>)
        .delete(subscriptions::delete::<S>),
    )
    .with_state(SubscriptionUsecase::new(store))
}
