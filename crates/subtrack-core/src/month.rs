//! Month-precision dates.
//!
//! Subscription periods are tracked to the month. Externally a month is the
//! token `MM-YYYY`; internally it is a [`NaiveDate`] pinned to day 1, so the
//! derived ordering is chronological.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A calendar month, e.g. `03-2024`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Month(NaiveDate);

impl Month {
  /// Build a month from its parts. Years are limited to four digits so that
  /// every month formats back to a valid token.
  pub fn new(year: i32, month: u32) -> Option<Self> {
    if !(0..=9999).contains(&year) {
      return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1).map(Self)
  }

  /// Parse an `MM-YYYY` token.
  pub fn parse(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidMonth(s.to_owned());

    let (mm, yyyy) = s.split_once('-').ok_or_else(invalid)?;
    let digits = |part: &str, len: usize| {
      part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(mm, 2) || !digits(yyyy, 4) {
      return Err(invalid());
    }

    let month: u32 = mm.parse().map_err(|_| invalid())?;
    let year: i32 = yyyy.parse().map_err(|_| invalid())?;
    Self::new(year, month).ok_or_else(invalid)
  }

  /// The month an instant falls in (UTC).
  pub fn containing(at: DateTime<Utc>) -> Self {
    Self(at.date_naive().with_day(1).unwrap_or(at.date_naive()))
  }

  /// `01-0001`, the value an unset start date decodes to.
  pub fn is_zero(&self) -> bool { self.0.year() == 1 && self.0.month() == 1 }

  pub fn year(&self) -> i32 { self.0.year() }

  pub fn month(&self) -> u32 { self.0.month() }

  /// The first day of the month.
  pub fn first_day(&self) -> NaiveDate { self.0 }

  /// Inverse of [`Month::first_day`]; `None` if `date` is not a first day.
  pub fn from_first_day(date: NaiveDate) -> Option<Self> {
    (date.day() == 1).then_some(date).and_then(|d| Self::new(d.year(), d.month()))
  }
}

impl fmt::Display for Month {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}-{:04}", self.0.month(), self.0.year())
  }
}

impl FromStr for Month {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for Month {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<Month> for String {
  fn from(m: Month) -> Self { m.to_string() }
}
