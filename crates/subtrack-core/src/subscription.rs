//! Subscription, the single entity managed by subtrack.
//!
//! A subscription is a recurring charge (`price`) a user pays for a named
//! service over a month-granular period. An absent `end_date` means the
//! subscription is still running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::month::Month;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:           Uuid,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      Uuid,
  pub start_date:   Month,
  pub end_date:     Option<Month>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// The first invariant a [`Subscription`] violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Invalid {
  #[error("service_name is required")]
  EmptyServiceName,
  #[error("price must be greater than 0")]
  NonPositivePrice,
  #[error("user_id is required")]
  NilUserId,
  #[error("start_date is required")]
  MissingStartDate,
  #[error("start_date cannot be in the future")]
  StartInFuture,
  #[error("end_date cannot be before start_date")]
  EndBeforeStart,
}

impl Subscription {
  /// A fresh subscription with a new id; both timestamps are `now`.
  pub fn new(
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_date: Month,
    end_date: Option<Month>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      service_name,
      price,
      user_id,
      start_date,
      end_date,
      created_at: now,
      updated_at: now,
    }
  }

  /// Check the entity invariants against the current clock.
  pub fn validate(&self) -> Result<(), Invalid> { validate(self, Utc::now()) }

  /// Whether the active period `[start_date, end_date]` intersects the
  /// window `[start, end]`. A missing end on either side is unbounded.
  pub fn overlaps(&self, start: Month, end: Option<Month>) -> bool {
    self.end_date.is_none_or(|e| e >= start)
      && end.is_none_or(|e| self.start_date <= e)
  }
}

/// Check the entity invariants in order, stopping at the first violation.
/// A start date in the month containing `now` is not "in the future".
pub fn validate(sub: &Subscription, now: DateTime<Utc>) -> Result<(), Invalid> {
  if sub.service_name.is_empty() {
    return Err(Invalid::EmptyServiceName);
  }
  if sub.price <= 0 {
    return Err(Invalid::NonPositivePrice);
  }
  if sub.user_id.is_nil() {
    return Err(Invalid::NilUserId);
  }
  if sub.start_date.is_zero() {
    return Err(Invalid::MissingStartDate);
  }
  if sub.start_date > Month::containing(now) {
    return Err(Invalid::StartInFuture);
  }
  if let Some(end) = sub.end_date
    && end < sub.start_date
  {
    return Err(Invalid::EndBeforeStart);
  }
  Ok(())
}
