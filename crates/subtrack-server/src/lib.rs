//! subtrack HTTP server: configuration, the top-level router and shutdown
//! handling.
//!
//! The subscription API is mounted under `/api/v1`; `/health` sits outside it.
//! Every response carries an `x-request-id` header, taken from the request
//! when present and generated otherwise.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  body::Body,
  http::{HeaderName, Request},
  routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use subtrack_core::store::SubscriptionStore;
use tokio::signal;
use tower_http::{
  request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
  timeout::TimeoutLayer,
  trace::TraceLayer,
};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, loaded from `config.toml` and `SUBTRACK_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Requests running longer than this are answered with 408.
  pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("subtrack.db"),
      request_timeout_secs: 30,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SubscriptionStore + 'static,
{
  let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
    let request_id = req
      .headers()
      .get(&REQUEST_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .unwrap_or("-");
    tracing::info_span!(
      "request",
      method = %req.method(),
      uri = %req.uri(),
      request_id,
    )
  });

  // The last layer added sees the request first. The id must be set before
  // tracing and copied onto every response, timeouts included.
  Router::new()
    .route("/health", get(health))
    .nest("/api/v1", subtrack_api::api_router(store))
    .layer(TimeoutLayer::new(config.request_timeout()))
    .layer(trace)
    .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
    .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Shutdown ─────────────────────────────────────────────────────────────────

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutdown signal received, draining connections");
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::http::{StatusCode, header};
  use subtrack_core::memory::MemoryStore;
  use tower::ServiceExt as _;

  use super::*;

  fn app() -> Router { router(Arc::new(MemoryStore::new()), &ServerConfig::default()) }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn health_is_ok_and_tagged_with_request_id() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let id = resp.headers().get("x-request-id").expect("request id header");
    assert!(!id.is_empty());
    assert_eq!(body_json(resp).await, json!({ "status": "ok" }));
  }

  #[tokio::test]
  async fn incoming_request_id_is_echoed() {
    let req = Request::builder()
      .uri("/health")
      .header("x-request-id", "abc-123")
      .body(Body::empty())
      .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
  }

  #[tokio::test]
  async fn api_is_mounted_under_v1() {
    let app = app();
    let body = json!({
      "service_name": "Netflix",
      "price": 999,
      "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
      "start_date": "01-2024"
    });
    let req = Request::builder()
      .method("POST")
      .uri("/api/v1/subscriptions")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-request-id"));
    let id = body_json(resp).await["id"].as_str().unwrap().to_owned();

    let req = Request::builder()
      .uri(format!("/api/v1/subscriptions/{id}"))
      .body(Body::empty())
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["service_name"], "Netflix");

    let req = Request::builder()
      .uri(format!("/subscriptions/{id}"))
      .body(Body::empty())
      .unwrap();
    assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_and_overrides() {
    let empty: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(empty.address(), "0.0.0.0:8080");
    assert_eq!(empty.request_timeout(), Duration::from_secs(30));

    let overridden: ServerConfig = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .set_override("request_timeout_secs", 5)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(overridden.port, 9000);
    assert_eq!(overridden.request_timeout_secs, 5);
    assert_eq!(overridden.store_path, PathBuf::from("subtrack.db"));
  }
}
