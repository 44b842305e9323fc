//! [`SqliteStore`], the SQLite implementation of [`SubscriptionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use subtrack_core::{
  Subscription,
  store::{PeriodQuery, SubscriptionStore},
};

use crate::{
  Error, Result,
  encode::{COLUMNS, RawSubscription, encode_dt, encode_month, encode_uuid},
  schema::{DROP_SCHEMA, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subscription store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and apply the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::connect(path).await?;
    store.migrate_up().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.migrate_up().await?;
    Ok(store)
  }

  /// Open the database at `path` without touching the schema.
  pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Apply the schema; a no-op on an up-to-date database.
  pub async fn migrate_up(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Drop the `subscriptions` table and reset the schema version.
  pub async fn migrate_down(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(DROP_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The value of `PRAGMA user_version`; `0` for an empty database.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn create(&self, subscription: &Subscription) -> Result<Uuid> {
    let id_str           = encode_uuid(subscription.id);
    let service_name     = subscription.service_name.clone();
    let price            = subscription.price;
    let user_id_str      = encode_uuid(subscription.user_id);
    let start_date_str   = encode_month(subscription.start_date);
    let end_date_str     = subscription.end_date.map(encode_month);
    let created_at_str   = encode_dt(subscription.created_at);
    let updated_at_str   = encode_dt(subscription.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             id, service_name, price, user_id,
             start_date, end_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            service_name,
            price,
            user_id_str,
            start_date_str,
            end_date_str,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %subscription.id, "subscription inserted");
    Ok(subscription.id)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM subscriptions WHERE id = ?1"),
            rusqlite::params![id_str],
            RawSubscription::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn update(&self, subscription: &Subscription) -> Result<()> {
    let id_str         = encode_uuid(subscription.id);
    let service_name   = subscription.service_name.clone();
    let price          = subscription.price;
    let start_date_str = encode_month(subscription.start_date);
    let end_date_str   = subscription.end_date.map(encode_month);
    let updated_at_str = encode_dt(subscription.updated_at);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions
           SET service_name = ?2, price = ?3, start_date = ?4,
               end_date = ?5, updated_at = ?6
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            service_name,
            price,
            start_date_str,
            end_date_str,
            updated_at_str,
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotFound(subscription.id));
    }
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    tracing::debug!(%id, "subscription deleted");
    Ok(())
  }

  async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Subscription>> {
    let user_id_str = user_id.map(encode_uuid);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM subscriptions
           WHERE ?1 IS NULL OR user_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn sum_for_period(&self, query: &PeriodQuery) -> Result<i64> {
    // A NULL end_date passes the first clause for any window, so a running
    // subscription matches iff it starts on or before the window end. A NULL
    // window end drops the second clause. SUM fails on i64 overflow.
    let start_str    = encode_month(query.start);
    let end_str      = query.end.map(encode_month);
    let user_id_str  = query.user_id.map(encode_uuid);
    let service_name = query.service_name.clone();

    let total = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(price), 0)
           FROM subscriptions
           WHERE (end_date IS NULL OR end_date >= ?1)
             AND (?2 IS NULL OR start_date <= ?2)
             AND (?3 IS NULL OR user_id = ?3)
             AND (?4 IS NULL OR service_name = ?4)",
          rusqlite::params![start_str, end_str, user_id_str, service_name],
          |row| row.get::<_, i64>(0),
        )?)
      })
      .await?;

    Ok(total)
  }
}
