//! [`StreakLedger`] — records logins against a user's streak state.
//!
//! The write path is a read-evaluate-write over the user record followed by
//! best-effort activity inserts. The clock is always supplied by the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::ActivityRecord,
  store::{ActivityLog, UpdateOutcome, UserRecordStore},
  streak::{StreakChange, evaluate, utc_day},
  user::{LoginHistory, StreakUpdate, UserStreakState, push_login_date},
};

/// How many times a conflicting conditional update is re-evaluated before
/// giving up.
const CONFLICT_RETRIES: usize = 1;

/// What `record_login` reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
  pub current_streak:  u32,
  pub last_login_date: Option<NaiveDate>,
  pub change:          StreakChange,
}

/// Maintains login streaks over a user store and an activity log.
#[derive(Debug, Clone)]
pub struct StreakLedger<U, A> {
  users:      U,
  activities: A,
}

impl<U, A> StreakLedger<U, A>
where
  U: UserRecordStore,
  A: ActivityLog,
{
  pub fn new(users: U, activities: A) -> Self { Self { users, activities } }

  pub fn users(&self) -> &U { &self.users }

  pub fn activities(&self) -> &A { &self.activities }

  /// Record a login at `now` for `user_id`.
  ///
  /// Logging in more than once on the same UTC day is a no-op after the
  /// first call: nothing is written and no activity is emitted.
  pub async fn record_login(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<LoginOutcome> {
    let today = utc_day(now);

    for _ in 0..=CONFLICT_RETRIES {
      let state = self.load(user_id).await?;
      let eval = evaluate(state.current_streak, state.last_login_date, today);

      if eval.change.is_unchanged() {
        debug!(%user_id, streak = state.current_streak, "already logged in today");
        return Ok(LoginOutcome {
          current_streak:  state.current_streak,
          last_login_date: state.last_login_date,
          change:          StreakChange::Unchanged,
        });
      }

      let mut login_dates = state.login_dates;
      push_login_date(&mut login_dates, today);
      let update = StreakUpdate {
        current_streak: eval.streak,
        last_login_date: today,
        login_dates,
      };

      let outcome = self
        .users
        .update(user_id, state.last_login_date, update)
        .await
        .map_err(Error::storage)?;

      match outcome {
        UpdateOutcome::Applied => {
          info!(
            %user_id,
            streak = eval.streak,
            change = eval.change.delta(),
            "login recorded"
          );
          self.emit_activities(user_id, eval.streak, eval.change, now).await;
          return Ok(LoginOutcome {
            current_streak:  eval.streak,
            last_login_date: Some(today),
            change:          eval.change,
          });
        }
        UpdateOutcome::NotFound => return Err(Error::NotFound(user_id)),
        UpdateOutcome::Conflict => {
          warn!(%user_id, "user record changed during login; re-evaluating");
        }
      }
    }

    Err(Error::Conflict(user_id))
  }

  /// Like [`record_login`](Self::record_login), but any failure is logged
  /// and swallowed. Meant for authentication-success hooks, where a streak
  /// problem must never block the login itself.
  pub async fn record_login_best_effort(
    &self,
    user_id: Uuid,
    now: DateTime<Utc>,
  ) -> Option<LoginOutcome> {
    match self.record_login(user_id, now).await {
      Ok(outcome) => Some(outcome),
      Err(e) => {
        warn!(%user_id, error = %e, "streak update failed");
        None
      }
    }
  }

  /// The stored login days and streak snapshot.
  pub async fn get_login_history(&self, user_id: Uuid) -> Result<LoginHistory> {
    Ok(self.load(user_id).await?.history())
  }

  async fn load(&self, user_id: Uuid) -> Result<UserStreakState> {
    self
      .users
      .get(user_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound(user_id))
  }

  async fn emit_activities(
    &self,
    user_id: Uuid,
    streak: u32,
    change: StreakChange,
    now: DateTime<Utc>,
  ) {
    let mut records = vec![ActivityRecord::login(user_id, streak, change.delta(), now)];
    if let StreakChange::Reset { previous } = change {
      records.push(ActivityRecord::streak_lost(user_id, streak, previous, now));
    }

    for record in records {
      let kind = record.kind;
      if let Err(e) = self.activities.insert(record).await {
        warn!(%user_id, %kind, error = %e, "failed to write activity record");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{
      Mutex,
      atomic::{AtomicBool, AtomicUsize, Ordering},
    },
  };

  use chrono::{Days, TimeZone as _};

  use super::*;
  use crate::{
    activity::ActivityKind,
    user::LOGIN_HISTORY_CAP,
  };

  #[derive(Debug, thiserror::Error)]
  #[error("backend unavailable")]
  struct Unavailable;

  // ── Test doubles ─────────────────────────────────────────────────────────

  #[derive(Default)]
  struct MemoryUsers {
    rows:        Mutex<HashMap<Uuid, UserStreakState>>,
    fail_writes: AtomicBool,
    writes:      AtomicUsize,
    /// Number of upcoming updates to reject with `Conflict`.
    conflicts:   AtomicUsize,
  }

  impl MemoryUsers {
    fn with_user(state: UserStreakState) -> Self {
      let users = Self::default();
      users.rows.lock().unwrap().insert(state.user_id, state);
      users
    }
  }

  impl UserRecordStore for MemoryUsers {
    type Error = Unavailable;

    async fn create(&self) -> Result<UserStreakState, Unavailable> {
      let state = UserStreakState::new(Uuid::new_v4(), Utc::now());
      self.rows.lock().unwrap().insert(state.user_id, state.clone());
      Ok(state)
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<UserStreakState>, Unavailable> {
      Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn list(&self) -> Result<Vec<UserStreakState>, Unavailable> {
      Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn update(
      &self,
      user_id: Uuid,
      expected_last_login: Option<NaiveDate>,
      update: StreakUpdate,
    ) -> Result<UpdateOutcome, Unavailable> {
      if self.fail_writes.load(Ordering::SeqCst) {
        return Err(Unavailable);
      }
      if self
        .conflicts
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
      {
        return Ok(UpdateOutcome::Conflict);
      }

      let mut rows = self.rows.lock().unwrap();
      let Some(row) = rows.get_mut(&user_id) else {
        return Ok(UpdateOutcome::NotFound);
      };
      if row.last_login_date != expected_last_login {
        return Ok(UpdateOutcome::Conflict);
      }
      row.apply(&update);
      self.writes.fetch_add(1, Ordering::SeqCst);
      Ok(UpdateOutcome::Applied)
    }
  }

  #[derive(Default)]
  struct MemoryActivities {
    records: Mutex<Vec<ActivityRecord>>,
    fail:    AtomicBool,
  }

  impl MemoryActivities {
    fn all(&self) -> Vec<ActivityRecord> { self.records.lock().unwrap().clone() }
  }

  impl ActivityLog for MemoryActivities {
    type Error = Unavailable;

    async fn insert(&self, record: ActivityRecord) -> Result<(), Unavailable> {
      if self.fail.load(Ordering::SeqCst) {
        return Err(Unavailable);
      }
      self.records.lock().unwrap().push(record);
      Ok(())
    }

    async fn recent(
      &self,
      user_id: Uuid,
      limit: usize,
    ) -> Result<Vec<ActivityRecord>, Unavailable> {
      Ok(
        self
          .all()
          .into_iter()
          .rev()
          .filter(|r| r.user_id == user_id)
          .take(limit)
          .collect(),
      )
    }
  }

  // ── Helpers ──────────────────────────────────────────────────────────────

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn fresh() -> (Uuid, StreakLedger<MemoryUsers, MemoryActivities>) {
    let state = UserStreakState::new(Uuid::new_v4(), at(2024, 1, 1, 0, 0));
    let id = state.user_id;
    (id, StreakLedger::new(MemoryUsers::with_user(state), MemoryActivities::default()))
  }

  fn with_streak(
    streak: u32,
    last: NaiveDate,
  ) -> (Uuid, StreakLedger<MemoryUsers, MemoryActivities>) {
    let mut state = UserStreakState::new(Uuid::new_v4(), at(2024, 1, 1, 0, 0));
    state.current_streak = streak;
    state.last_login_date = Some(last);
    state.login_dates = vec![last];
    let id = state.user_id;
    (id, StreakLedger::new(MemoryUsers::with_user(state), MemoryActivities::default()))
  }

  async fn stored(ledger: &StreakLedger<MemoryUsers, MemoryActivities>, id: Uuid) -> UserStreakState {
    ledger.users().get(id).await.unwrap().unwrap()
  }

  // ── First login ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_login_starts_streak() {
    let (id, ledger) = fresh();
    let now = at(2024, 3, 10, 9, 30);

    let outcome = ledger.record_login(id, now).await.unwrap();
    assert_eq!(outcome.current_streak, 1);
    assert_eq!(outcome.change, StreakChange::Started);

    let state = stored(&ledger, id).await;
    assert_eq!(state.current_streak, 1);
    assert_eq!(state.last_login_date, Some(day(2024, 3, 10)));
    assert_eq!(state.login_dates, vec![day(2024, 3, 10)]);

    let acts = ledger.activities().all();
    assert_eq!(acts.len(), 1);
    assert_eq!(acts[0].kind, ActivityKind::Login);
    assert_eq!(acts[0].metadata.streak, 1);
    assert_eq!(acts[0].metadata.streak_change, 1);
    assert_eq!(acts[0].created_at, now);
  }

  // ── Idempotence ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn second_login_same_day_is_noop() {
    let (id, ledger) = fresh();
    ledger.record_login(id, at(2024, 3, 10, 0, 1)).await.unwrap();
    let after_first = stored(&ledger, id).await;

    let outcome = ledger.record_login(id, at(2024, 3, 10, 23, 59)).await.unwrap();
    assert_eq!(outcome.change, StreakChange::Unchanged);
    assert_eq!(outcome.current_streak, 1);

    assert_eq!(stored(&ledger, id).await, after_first);
    assert_eq!(ledger.users().writes.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.activities().all().len(), 1);
  }

  // ── Growth and reset ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn consecutive_days_grow_streak() {
    let (id, ledger) = fresh();
    let start = at(2024, 1, 30, 12, 0);

    for d in 0..45_u64 {
      ledger.record_login(id, start + Days::new(d)).await.unwrap();
    }

    let history = ledger.get_login_history(id).await.unwrap();
    assert_eq!(history.streak, 45);
    assert_eq!(history.login_dates.len(), 45);
    // No loss records on an unbroken run.
    assert!(
      ledger
        .activities()
        .all()
        .iter()
        .all(|r| r.kind == ActivityKind::Login)
    );
  }

  #[tokio::test]
  async fn gap_resets_and_emits_loss_record() {
    for gap in [2_u64, 5, 90] {
      let (id, ledger) = with_streak(4, day(2024, 3, 10));
      let later = at(2024, 3, 10, 8, 0) + Days::new(gap);

      let outcome = ledger.record_login(id, later).await.unwrap();
      assert_eq!(outcome.current_streak, 1);
      assert_eq!(outcome.change, StreakChange::Reset { previous: 4 });

      let acts = ledger.activities().all();
      assert_eq!(acts.len(), 2);
      assert_eq!(acts[0].kind, ActivityKind::Login);
      assert_eq!(acts[0].metadata.streak_change, -4);
      assert_eq!(acts[1].kind, ActivityKind::StreakAchieved);
      assert_eq!(acts[1].metadata.previous_streak, Some(4));
      assert_eq!(acts[1].metadata.streak_change, -4);
      assert_eq!(acts[1].metadata.streak, 1);
    }
  }

  #[tokio::test]
  async fn gap_without_prior_streak_emits_no_loss() {
    let (id, ledger) = with_streak(0, day(2024, 3, 1));
    let outcome = ledger.record_login(id, at(2024, 3, 10, 8, 0)).await.unwrap();
    assert_eq!(outcome.change, StreakChange::Started);

    let acts = ledger.activities().all();
    assert_eq!(acts.len(), 1);
    assert_eq!(acts[0].metadata.streak_change, 1);
  }

  // ── History cap ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn history_keeps_most_recent_365_days() {
    let (id, ledger) = fresh();
    let start = at(2023, 1, 1, 6, 0);

    for d in 0..400_u64 {
      ledger.record_login(id, start + Days::new(d)).await.unwrap();
    }

    let history = ledger.get_login_history(id).await.unwrap();
    assert_eq!(history.login_dates.len(), LOGIN_HISTORY_CAP);
    assert_eq!(history.streak, 400);

    let first_kept = utc_day(start + Days::new(35));
    let last = utc_day(start + Days::new(399));
    assert_eq!(history.login_dates.first(), Some(&first_kept));
    assert_eq!(history.login_dates.last(), Some(&last));
    assert!(history.login_dates.windows(2).all(|w| w[0] < w[1]));
  }

  // ── Missing users ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_user_is_not_found() {
    let (_, ledger) = fresh();
    let ghost = Uuid::new_v4();

    let err = ledger.record_login(ghost, at(2024, 3, 10, 9, 0)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(id) if id == ghost));

    let err = ledger.get_login_history(ghost).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(id) if id == ghost));

    assert_eq!(ledger.users().writes.load(Ordering::SeqCst), 0);
    assert!(ledger.activities().all().is_empty());
  }

  // ── Failure handling ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn activity_failure_does_not_fail_login() {
    let (id, ledger) = with_streak(3, day(2024, 3, 1));
    ledger.activities().fail.store(true, Ordering::SeqCst);

    let outcome = ledger.record_login(id, at(2024, 3, 10, 9, 0)).await.unwrap();
    assert_eq!(outcome.change, StreakChange::Reset { previous: 3 });
    assert_eq!(stored(&ledger, id).await.current_streak, 1);
    assert!(ledger.activities().all().is_empty());
  }

  #[tokio::test]
  async fn storage_failure_propagates_without_activity() {
    let (id, ledger) = fresh();
    ledger.users().fail_writes.store(true, Ordering::SeqCst);

    let err = ledger.record_login(id, at(2024, 3, 10, 9, 0)).await.unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(ledger.activities().all().is_empty());
    assert_eq!(stored(&ledger, id).await.last_login_date, None);
  }

  #[tokio::test]
  async fn best_effort_swallows_errors() {
    let (_, ledger) = fresh();
    let outcome = ledger
      .record_login_best_effort(Uuid::new_v4(), at(2024, 3, 10, 9, 0))
      .await;
    assert!(outcome.is_none());
  }

  #[tokio::test]
  async fn single_conflict_is_retried() {
    let (id, ledger) = fresh();
    ledger.users().conflicts.store(1, Ordering::SeqCst);

    let outcome = ledger.record_login(id, at(2024, 3, 10, 9, 0)).await.unwrap();
    assert_eq!(outcome.current_streak, 1);
    assert_eq!(ledger.users().writes.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn repeated_conflicts_surface_as_error() {
    let (id, ledger) = fresh();
    ledger.users().conflicts.store(5, Ordering::SeqCst);

    let err = ledger.record_login(id, at(2024, 3, 10, 9, 0)).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(ledger.activities().all().is_empty());
  }

  // ── Worked example ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn extend_then_break_after_gap() {
    let (id, ledger) = with_streak(5, day(2024, 3, 10));

    let first = ledger.record_login(id, at(2024, 3, 11, 23, 59)).await.unwrap();
    assert_eq!(first.current_streak, 6);
    assert_eq!(first.last_login_date, Some(day(2024, 3, 11)));

    let acts = ledger.activities().all();
    assert_eq!(acts.len(), 1);
    assert_eq!(acts[0].kind, ActivityKind::Login);
    assert_eq!(acts[0].metadata.streak, 6);
    assert_eq!(acts[0].metadata.streak_change, 1);

    let second = ledger.record_login(id, at(2024, 3, 14, 0, 5)).await.unwrap();
    assert_eq!(second.current_streak, 1);
    assert_eq!(second.last_login_date, Some(day(2024, 3, 14)));

    let acts = ledger.activities().all();
    assert_eq!(acts.len(), 3);
    assert_eq!(acts[1].kind, ActivityKind::Login);
    assert_eq!(acts[1].metadata.streak, 1);
    assert_eq!(acts[1].metadata.streak_change, -6);
    assert_eq!(acts[2].kind, ActivityKind::StreakAchieved);
    assert_eq!(acts[2].metadata.previous_streak, Some(6));

    let state = stored(&ledger, id).await;
    assert_eq!(
      state.login_dates,
      vec![day(2024, 3, 10), day(2024, 3, 11), day(2024, 3, 14)]
    );
  }
}
