//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed nanosecond width,
//! so they sort lexicographically and round-trip without loss. Months are
//! stored as their first day (`YYYY-MM-01`). UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use subtrack_core::{Month, Subscription};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Month ────────────────────────────────────────────────────────────────────

pub fn encode_month(m: Month) -> String { m.first_day().format("%Y-%m-%d").to_string() }

pub fn decode_month(s: &str) -> Result<Month> {
  let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))?;
  Month::from_first_day(date)
    .ok_or_else(|| Error::DateParse(format!("{s:?} is not the first day of a month")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that reads whole rows; the order
/// matches [`RawSubscription::from_row`].
pub const COLUMNS: &str =
  "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub id:           String,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   String,
  pub end_date:     Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      service_name: row.get(1)?,
      price:        row.get(2)?,
      user_id:      row.get(3)?,
      start_date:   row.get(4)?,
      end_date:     row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:           decode_uuid(&self.id)?,
      service_name: self.service_name,
      price:        self.price,
      user_id:      decode_uuid(&self.user_id)?,
      start_date:   decode_month(&self.start_date)?,
      end_date:     self.end_date.as_deref().map(decode_month).transpose()?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn month_column_sorts_chronologically() {
    let early = encode_month(Month::parse("12-0999").unwrap());
    let late = encode_month(Month::parse("01-2024").unwrap());
    assert_eq!(early, "0999-12-01");
    assert_eq!(late, "2024-01-01");
    assert!(early < late);
  }

  #[test]
  fn decode_month_rejects_mid_month_dates() {
    assert!(decode_month("2024-03-01").is_ok());
    assert!(matches!(decode_month("2024-03-15"), Err(Error::DateParse(_))));
    assert!(matches!(decode_month("03-2024"), Err(Error::DateParse(_))));
  }

  #[test]
  fn timestamps_keep_nanoseconds_and_fixed_width() {
    let dt = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    let whole = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
    assert_eq!(encode_dt(dt).len(), encode_dt(whole).len());
  }
}
