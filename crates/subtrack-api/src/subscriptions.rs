//! Handlers for `/subscriptions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/subscriptions` | 201 with `{"id": ...}` |
//! | `GET`    | `/subscriptions?user_id=<uuid>` | `user_id` is required |
//! | `GET`    | `/subscriptions/summary?start_date=MM-YYYY` | Optional `end_date`, `user_id`, `service_name` |
//! | `GET`    | `/subscriptions/{id}` | 404 if not found |
//! | `PUT`    | `/subscriptions/{id}` | Partial update |
//! | `DELETE` | `/subscriptions/{id}` | `{"result": "successful"}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use subtrack_core::store::SubscriptionStore;

use crate::{
  dto::{
    CreateSubscriptionRequest, DeleteSubscriptionResponse, ListParams,
    ListSubscriptionsResponse, SubscriptionResponse, SummaryParams, SummaryResponse,
    UpdateSubscriptionRequest,
  },
  error::ApiError,
  usecase::SubscriptionUsecase,
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subscriptions`
pub async fn create<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Json(body): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let created = usecase.create(body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /subscriptions/{id}`
pub async fn get_one<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Path(id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
  Ok(Json(usecase.get(&id).await?))
}

/// `GET /subscriptions?user_id=<uuid>`
pub async fn list<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListSubscriptionsResponse>, ApiError> {
  Ok(Json(usecase.list(params.user_id.as_deref()).await?))
}

/// `GET /subscriptions/summary`
pub async fn summary<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
  Ok(Json(usecase.sum(params).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /subscriptions/{id}`
pub async fn update<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
  Ok(Json(usecase.update(&id, body).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subscriptions/{id}`
pub async fn delete<S: SubscriptionStore>(
  State(usecase): State<SubscriptionUsecase<S>>,
  Path(id): Path<String>,
) -> Result<Json<DeleteSubscriptionResponse>, ApiError> {
  usecase.delete(&id).await?;
  Ok(Json(DeleteSubscriptionResponse::successful()))
}
