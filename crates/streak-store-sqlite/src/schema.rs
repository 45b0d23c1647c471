//! SQL schema for the streak SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per user. Streak columns are only written by the ledger,
-- always through a conditional update on last_login_date.
CREATE TABLE IF NOT EXISTS users (
    user_id          TEXT PRIMARY KEY,
    created_at       TEXT NOT NULL,
    current_streak   INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
    last_login_date  TEXT,                        -- YYYY-MM-DD (UTC) or NULL
    login_dates      TEXT NOT NULL DEFAULT '[]'   -- JSON array of YYYY-MM-DD
);

-- Activity records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS activities (
    activity_id  TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    kind         TEXT NOT NULL,   -- 'login' | 'streak_achieved'
    description  TEXT NOT NULL,
    metadata     TEXT NOT NULL,   -- JSON ActivityMetadata
    created_at   TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS activities_user_idx ON activities(user_id, created_at);

PRAGMA user_version = 1;
";
