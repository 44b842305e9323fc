//! SQL schema for the subtrack SQLite store.
//!
//! Applied at connection startup and stamped into `PRAGMA user_version`.
//! Later migrations will be gated on that version number.

/// Version written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Month columns hold the first day of the month as YYYY-MM-DD, so text
-- comparison is chronological.
CREATE TABLE IF NOT EXISTS subscriptions (
    id            TEXT PRIMARY KEY,
    service_name  TEXT    NOT NULL,
    price         INTEGER NOT NULL,
    user_id       TEXT    NOT NULL,
    start_date    TEXT    NOT NULL,
    end_date      TEXT,             -- NULL while the subscription is running
    created_at    TEXT    NOT NULL, -- RFC 3339 UTC, fixed nanosecond width
    updated_at    TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx    ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_created_idx ON subscriptions(created_at);

PRAGMA user_version = 1;
";

/// Reverts [`SCHEMA`].
pub const DROP_SCHEMA: &str = "
DROP INDEX IF EXISTS subscriptions_created_idx;
DROP INDEX IF EXISTS subscriptions_user_idx;
DROP TABLE IF EXISTS subscriptions;

PRAGMA user_version = 0;
";
