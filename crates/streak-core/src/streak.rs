//! Pure streak evaluation: given the stored snapshot and today's UTC day,
//! decide how the streak moves.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a login moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakChange {
  /// First login ever, or a gap with no streak to lose.
  Started,
  /// Login on the day after the last one.
  Extended,
  /// A gap of two or more days broke a nonzero streak.
  Reset { previous: u32 },
  /// Already logged in today; nothing is written.
  Unchanged,
}

impl StreakChange {
  /// Signed change as recorded in activity metadata.
  pub fn delta(self) -> i64 {
    match self {
      Self::Started | Self::Extended => 1,
      Self::Reset { previous } => -i64::from(previous),
      Self::Unchanged => 0,
    }
  }

  pub fn is_unchanged(self) -> bool { matches!(self, Self::Unchanged) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
  pub streak: u32,
  pub change: StreakChange,
}

/// The UTC calendar day of an instant. Time of day is discarded.
pub fn utc_day(at: DateTime<Utc>) -> NaiveDate { at.date_naive() }

/// Decide the new streak for a login on `today`.
///
/// A stored day later than `today` (the clock went backwards) is treated like
/// a same-day login: the history never moves backwards.
pub fn evaluate(
  current_streak: u32,
  last_login: Option<NaiveDate>,
  today: NaiveDate,
) -> Evaluation {
  let Some(last) = last_login else {
    return Evaluation { streak: 1, change: StreakChange::Started };
  };

  match (today - last).num_days() {
    ..=0 => Evaluation { streak: current_streak, change: StreakChange::Unchanged },
    1 => Evaluation {
      streak: current_streak.saturating_add(1),
      change: StreakChange::Extended,
    },
    _ if current_streak > 0 => Evaluation {
      streak: 1,
      change: StreakChange::Reset { previous: current_streak },
    },
    _ => Evaluation { streak: 1, change: StreakChange::Started },
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn first_login_starts_at_one() {
    let e = evaluate(0, None, day(2024, 3, 10));
    assert_eq!(e, Evaluation { streak: 1, change: StreakChange::Started });
    assert_eq!(e.change.delta(), 1);
  }

  #[test]
  fn same_day_is_unchanged() {
    let e = evaluate(4, Some(day(2024, 3, 10)), day(2024, 3, 10));
    assert_eq!(e.streak, 4);
    assert!(e.change.is_unchanged());
    assert_eq!(e.change.delta(), 0);
  }

  #[test]
  fn next_day_extends() {
    let e = evaluate(5, Some(day(2024, 3, 10)), day(2024, 3, 11));
    assert_eq!(e, Evaluation { streak: 6, change: StreakChange::Extended });
  }

  #[test]
  fn gap_resets_nonzero_streak() {
    for gap in [2_u64, 3, 30, 400] {
      let today = day(2024, 3, 10) + chrono::Days::new(gap);
      let e = evaluate(7, Some(day(2024, 3, 10)), today);
      assert_eq!(e.streak, 1);
      assert_eq!(e.change, StreakChange::Reset { previous: 7 });
      assert_eq!(e.change.delta(), -7);
    }
  }

  #[test]
  fn gap_with_zero_streak_is_a_plain_start() {
    let e = evaluate(0, Some(day(2024, 3, 1)), day(2024, 3, 10));
    assert_eq!(e, Evaluation { streak: 1, change: StreakChange::Started });
  }

  #[test]
  fn earlier_day_than_stored_is_unchanged() {
    let e = evaluate(3, Some(day(2024, 3, 10)), day(2024, 3, 8));
    assert_eq!(e.streak, 3);
    assert!(e.change.is_unchanged());
  }

  #[test]
  fn day_boundary_ignores_elapsed_time() {
    let late  = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
    let early = Utc.with_ymd_and_hms(2024, 3, 11, 0, 1, 0).unwrap();
    let e = evaluate(1, Some(utc_day(late)), utc_day(early));
    assert_eq!(e.change, StreakChange::Extended);
  }
}
