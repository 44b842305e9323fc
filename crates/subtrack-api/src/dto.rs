//! Request and response bodies of the HTTP API.
//!
//! Ids and months arrive as text and are parsed by the
//! [`SubscriptionUsecase`](crate::usecase::SubscriptionUsecase) so that
//! malformed values produce our own 400 messages rather than extractor
//! rejections.

use serde::{Deserialize, Serialize};
use subtrack_core::{Month, Subscription};
use uuid::Uuid;

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   String,
  #[serde(default)]
  pub end_date:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscriptionResponse {
  pub id: Uuid,
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Every field is optional; absent fields leave the stored value alone.
///
/// `end_date: ""` clears the end date, making the subscription open-ended.
/// An explicit `null` is treated the same as an absent field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSubscriptionRequest {
  pub service_name: Option<String>,
  pub price:        Option<i64>,
  pub start_date:   Option<String>,
  pub end_date:     Option<String>,
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// The externally visible view of a [`Subscription`]; timestamps are not
/// exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
  pub id:           Uuid,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      Uuid,
  pub start_date:   Month,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date:     Option<Month>,
}

impl From<Subscription> for SubscriptionResponse {
  fn from(sub: Subscription) -> Self {
    Self {
      id:           sub.id,
      service_name: sub.service_name,
      price:        sub.price,
      user_id:      sub.user_id,
      start_date:   sub.start_date,
      end_date:     sub.end_date,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
  pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
  pub total: usize,
  pub list:  Vec<SubscriptionResponse>,
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSubscriptionResponse {
  pub result: String,
}

impl DeleteSubscriptionResponse {
  pub fn successful() -> Self { Self { result: "successful".into() } }
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryParams {
  pub user_id:      Option<String>,
  pub service_name: Option<String>,
  pub start_date:   Option<String>,
  pub end_date:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
  pub total: i64,
}
