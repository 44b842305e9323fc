//! Error types for `subtrack-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{store::StoreError, subscription::Invalid};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0:?} is not a month (expected MM-YYYY)")]
  InvalidMonth(String),

  #[error(transparent)]
  Invalid(#[from] Invalid),

  #[error("subscription not found: {0}")]
  NotFound(Uuid),

  #[error("subscription {0} already exists")]
  Duplicate(Uuid),

  #[error("in-memory store lock poisoned")]
  Poisoned,

  #[error("sum of prices overflows i64")]
  Overflow,
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool { matches!(self, Error::NotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
