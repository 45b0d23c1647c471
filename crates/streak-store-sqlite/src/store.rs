//! [`SqliteStore`] — the SQLite implementation of [`UserRecordStore`] and
//! [`ActivityLog`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use streak_core::{
  activity::ActivityRecord,
  store::{ActivityLog, UpdateOutcome, UserRecordStore},
  user::{StreakUpdate, UserStreakState},
};

use crate::{
  Error, Result,
  encode::{
    RawActivity, RawUser, encode_day, encode_days, encode_dt, encode_metadata,
    encode_uuid,
  },
  schema::SCHEMA,
};

const USER_COLUMNS: &str =
  "user_id, created_at, current_streak, last_login_date, login_dates";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A streak store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Create a user record with a caller-supplied UUID.
  ///
  /// Used when the identity provider has already minted the user's id.
  /// Returns [`Error::UserExists`] if the UUID is already taken.
  pub async fn add_user_with_id(&self, user_id: Uuid) -> Result<UserStreakState> {
    let state = UserStreakState::new(user_id, Utc::now());

    let id_str   = encode_uuid(user_id);
    let at_str   = encode_dt(state.created_at);
    let days_str = encode_days(&state.login_dates)?;

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO users (user_id, created_at, current_streak, login_dates)
           VALUES (?1, ?2, 0, ?3)",
          rusqlite::params![id_str, at_str, days_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::UserExists(user_id));
    }
    debug!(%user_id, "user record created");
    Ok(state)
  }

  async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(user_id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── UserRecordStore impl ─────────────────────────────────────────────────────

impl UserRecordStore for SqliteStore {
  type Error = Error;

  async fn create(&self) -> Result<UserStreakState> {
    self.add_user_with_id(Uuid::new_v4()).await
  }

  async fn get(&self, user_id: Uuid) -> Result<Option<UserStreakState>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_state).transpose()
  }

  async fn list(&self) -> Result<Vec<UserStreakState>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_state).collect()
  }

  async fn update(
    &self,
    user_id:             Uuid,
    expected_last_login: Option<NaiveDate>,
    update:              StreakUpdate,
  ) -> Result<UpdateOutcome> {
    let id_str       = encode_uuid(user_id);
    let expected_str = expected_last_login.map(encode_day);
    let last_str     = encode_day(update.last_login_date);
    let days_str     = encode_days(&update.login_dates)?;
    let streak       = i64::from(update.current_streak);

    // `IS` rather than `=` so a NULL expectation matches a NULL column.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users
              SET current_streak = ?2, last_login_date = ?3, login_dates = ?4
            WHERE user_id = ?1
              AND last_login_date IS ?5",
          rusqlite::params![id_str, streak, last_str, days_str, expected_str],
        )?)
      })
      .await?;

    if changed == 1 {
      return Ok(UpdateOutcome::Applied);
    }

    if self.user_exists(user_id).await? {
      Ok(UpdateOutcome::Conflict)
    } else {
      Ok(UpdateOutcome::NotFound)
    }
  }
}

// ─── ActivityLog impl ─────────────────────────────────────────────────────────

impl ActivityLog for SqliteStore {
  type Error = Error;

  async fn insert(&self, record: ActivityRecord) -> Result<()> {
    let id_str       = encode_uuid(record.activity_id);
    let user_str     = encode_uuid(record.user_id);
    let kind_str     = record.kind.as_ref().to_owned();
    let metadata_str = encode_metadata(&record.metadata)?;
    let at_str       = encode_dt(record.created_at);
    let description  = record.description;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (
             activity_id, user_id, kind, description, metadata, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, user_str, kind_str, description, metadata_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn recent(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityRecord>> {
    let user_str  = encode_uuid(user_id);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT activity_id, user_id, kind, description, metadata, created_at
             FROM activities
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, limit_val], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_record).collect()
  }
}
