//! Collaborator traits the ledger is written against.
//!
//! The traits are implemented by storage backends (e.g.
//! `streak-store-sqlite`). Higher layers (`streak-api`, `streak-server`)
//! depend on these abstractions, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  activity::ActivityRecord,
  user::{StreakUpdate, UserStreakState},
};

/// Result of a conditional [`UserRecordStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
  Applied,
  /// No record exists for the user.
  NotFound,
  /// The stored `last_login_date` no longer matches the expected value.
  Conflict,
}

// ─── User records ────────────────────────────────────────────────────────────

/// Storage for per-user streak state.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait UserRecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create a record with default streak fields and a fresh UUID.
  fn create(
    &self,
  ) -> impl Future<Output = Result<UserStreakState, Self::Error>> + Send + '_;

  /// Retrieve a user's streak state. Returns `None` if not found.
  fn get(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserStreakState>, Self::Error>> + Send + '_;

  /// List all user records.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<UserStreakState>, Self::Error>> + Send + '_;

  /// Write `update`, but only if the stored `last_login_date` still equals
  /// `expected_last_login` (compare-and-swap on the value the caller read).
  fn update(
    &self,
    user_id: Uuid,
    expected_last_login: Option<NaiveDate>,
    update: StreakUpdate,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + '_;
}

// ─── Activity log ────────────────────────────────────────────────────────────

/// Append-only activity log. Writes from the ledger are best-effort.
pub trait ActivityLog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert(
    &self,
    record: ActivityRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The most recent `limit` records for a user, newest first.
  fn recent(
    &self,
    user_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ActivityRecord>, Self::Error>> + Send + '_;
}
