//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they sort
//! lexically. Calendar days are `YYYY-MM-DD`. Login-day lists and activity
//! metadata are compact JSON. UUIDs are hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use streak_core::{
  activity::{ActivityKind, ActivityMetadata, ActivityRecord},
  user::UserStreakState,
};
use uuid::Uuid;

use crate::{Error, Result};

const DAY_FORMAT: &str = "%Y-%m-%d";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_day(d: NaiveDate) -> String { d.format(DAY_FORMAT).to_string() }

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DAY_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_days(days: &[NaiveDate]) -> Result<String> {
  Ok(serde_json::to_string(days)?)
}

pub fn decode_days(s: &str) -> Result<Vec<NaiveDate>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Activity fields ──────────────────────────────────────────────────────────

pub fn decode_kind(s: &str) -> Result<ActivityKind> {
  ActivityKind::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown activity kind: {s:?}")))
}

pub fn encode_metadata(m: &ActivityMetadata) -> Result<String> {
  Ok(serde_json::to_string(m)?)
}

pub fn decode_metadata(s: &str) -> Result<ActivityMetadata> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:         String,
  pub created_at:      String,
  pub current_streak:  i64,
  pub last_login_date: Option<String>,
  pub login_dates:     String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:         row.get(0)?,
      created_at:      row.get(1)?,
      current_streak:  row.get(2)?,
      last_login_date: row.get(3)?,
      login_dates:     row.get(4)?,
    })
  }

  pub fn into_state(self) -> Result<UserStreakState> {
    let current_streak = u32::try_from(self.current_streak).map_err(|_| {
      Error::Decode(format!("current_streak out of range: {}", self.current_streak))
    })?;

    Ok(UserStreakState {
      user_id: decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      current_streak,
      last_login_date: self.last_login_date.as_deref().map(decode_day).transpose()?,
      login_dates: decode_days(&self.login_dates)?,
    })
  }
}

/// Raw strings read directly from an `activities` row.
pub struct RawActivity {
  pub activity_id: String,
  pub user_id:     String,
  pub kind:        String,
  pub description: String,
  pub metadata:    String,
  pub created_at:  String,
}

impl RawActivity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id: row.get(0)?,
      user_id:     row.get(1)?,
      kind:        row.get(2)?,
      description: row.get(3)?,
      metadata:    row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<ActivityRecord> {
    Ok(ActivityRecord {
      activity_id: decode_uuid(&self.activity_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      kind:        decode_kind(&self.kind)?,
      description: self.description,
      metadata:    decode_metadata(&self.metadata)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
