//! Per-user streak state and the read models derived from it.
//!
//! A user record is created with defaults (no streak, empty history) and is
//! only ever mutated by the ledger's write path.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on the number of stored login days. Once full, each new login
/// drops exactly the oldest entry regardless of its age.
pub const LOGIN_HISTORY_CAP: usize = 365;

/// Default width of the login heatmap, in days.
pub const HEATMAP_DAYS: u32 = 30;

// ─── Persisted state ─────────────────────────────────────────────────────────

/// The streak fields of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStreakState {
  pub user_id:         Uuid,
  pub created_at:      DateTime<Utc>,
  /// Consecutive UTC days with a login, ending at `last_login_date`. A
  /// snapshot taken at the last login; not recomputed between logins.
  pub current_streak:  u32,
  pub last_login_date: Option<NaiveDate>,
  /// Chronological, at most [`LOGIN_HISTORY_CAP`] entries.
  pub login_dates:     Vec<NaiveDate>,
}

impl UserStreakState {
  /// A freshly created record with no logins.
  pub fn new(user_id: Uuid, created_at: DateTime<Utc>) -> Self {
    Self {
      user_id,
      created_at,
      current_streak: 0,
      last_login_date: None,
      login_dates: Vec::new(),
    }
  }

  pub fn history(&self) -> LoginHistory {
    LoginHistory {
      login_dates: self.login_dates.clone(),
      streak:      self.current_streak,
    }
  }

  /// Apply a committed update to the in-memory copy.
  pub fn apply(&mut self, update: &StreakUpdate) {
    self.current_streak = update.current_streak;
    self.last_login_date = Some(update.last_login_date);
    self.login_dates = update.login_dates.clone();
  }
}

/// The fields written back to a user record after a login is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
  pub current_streak:  u32,
  pub last_login_date: NaiveDate,
  pub login_dates:     Vec<NaiveDate>,
}

/// Append `day` unless it is already the most recent entry, then drop the
/// oldest entries beyond [`LOGIN_HISTORY_CAP`].
pub fn push_login_date(dates: &mut Vec<NaiveDate>, day: NaiveDate) {
  if dates.last() != Some(&day) {
    dates.push(day);
  }
  if dates.len() > LOGIN_HISTORY_CAP {
    let excess = dates.len() - LOGIN_HISTORY_CAP;
    dates.drain(..excess);
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// What the history widget reads: the stored days and the streak snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHistory {
  pub login_dates: Vec<NaiveDate>,
  pub streak:      u32,
}

/// One cell of the login heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
  pub date:      NaiveDate,
  pub logged_in: bool,
}

impl LoginHistory {
  /// Project the `days` calendar days ending at `today` (inclusive), oldest
  /// first.
  pub fn heatmap(&self, today: NaiveDate, days: u32) -> Vec<HeatmapDay> {
    (0..days)
      .rev()
      .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
      .map(|date| HeatmapDay {
        date,
        // `login_dates` is strictly increasing.
        logged_in: self.login_dates.binary_search(&date).is_ok(),
      })
      .collect()
  }

  /// Number of days in the trailing `days`-day window with a login.
  pub fn active_days(&self, today: NaiveDate, days: u32) -> usize {
    self.heatmap(today, days).iter().filter(|d| d.logged_in).count()
  }
}
