//! Activity records — append-only notes emitted as a side effect of logins.
//!
//! Records are written best-effort and are never read back by the ledger for
//! any control-flow decision; they exist for the user's history feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// The kind of an activity record.
///
/// `StreakAchieved` is emitted only when a streak is *lost*. The name is kept
/// as-is because existing feeds key on it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
  Login,
  StreakAchieved,
}

/// Structured payload attached to an activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
  pub streak:          u32,
  pub streak_change:   i64,
  /// Present only on streak-loss records.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub previous_streak: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub activity_id: Uuid,
  pub user_id:     Uuid,
  pub kind:        ActivityKind,
  pub description: String,
  pub metadata:    ActivityMetadata,
  pub created_at:  DateTime<Utc>,
}

impl ActivityRecord {
  /// A `login` note carrying the post-login streak and its change.
  pub fn login(
    user_id: Uuid,
    streak: u32,
    streak_change: i64,
    at: DateTime<Utc>,
  ) -> Self {
    let description = if streak == 1 {
      "Logged in (1 day streak)".to_string()
    } else {
      format!("Logged in ({streak} day streak)")
    };

    Self {
      activity_id: Uuid::new_v4(),
      user_id,
      kind: ActivityKind::Login,
      description,
      metadata: ActivityMetadata { streak, streak_change, previous_streak: None },
      created_at: at,
    }
  }

  /// A loss notice: the `previous` streak was broken by a gap.
  pub fn streak_lost(
    user_id: Uuid,
    streak: u32,
    previous: u32,
    at: DateTime<Utc>,
  ) -> Self {
    Self {
      activity_id: Uuid::new_v4(),
      user_id,
      kind: ActivityKind::StreakAchieved,
      description: format!("Lost a {previous} day login streak"),
      metadata: ActivityMetadata {
        streak,
        streak_change: -i64::from(previous),
        previous_streak: Some(previous),
      },
      created_at: at,
    }
  }
}
