//! Handlers for login recording and the history read path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/:id/logins` | Body: `{"at":"<rfc3339>"}`, `at` optional (defaults to now) |
//! | `GET`  | `/users/:id/history` | Stored login days and streak |
//! | `GET`  | `/users/:id/heatmap` | `?days=1..=365` (default 30), `?today=YYYY-MM-DD` |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use streak_core::{
  ledger::LoginOutcome,
  store::{ActivityLog, UserRecordStore},
  streak::utc_day,
  user::{HEATMAP_DAYS, HeatmapDay, LOGIN_HISTORY_CAP, LoginHistory},
};
use uuid::Uuid;

use crate::{Ledger, error::ApiError};

// ─── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  /// The instant of the login. The server clock is used when absent.
  pub at: Option<DateTime<Utc>>,
}

/// `POST /users/:id/logins`
pub async fn record<S>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  body: Bytes,
) -> Result<Json<LoginOutcome>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  let body: LoginBody = if body.is_empty() {
    LoginBody::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
  };

  let at = body.at.unwrap_or_else(Utc::now);
  let outcome = ledger.record_login(id, at).await?;
  Ok(Json(outcome))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /users/:id/history`
pub async fn history<S>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LoginHistory>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  Ok(Json(ledger.get_login_history(id).await?))
}

// ─── Heatmap ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HeatmapParams {
  pub days:  Option<u32>,
  /// Last day of the window. Defaults to today (UTC).
  pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Heatmap {
  pub streak: u32,
  pub days:   Vec<HeatmapDay>,
}

/// `GET /users/:id/heatmap[?days=N][&today=YYYY-MM-DD]`
pub async fn heatmap<S>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<HeatmapParams>,
) -> Result<Json<Heatmap>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  let days = params.days.unwrap_or(HEATMAP_DAYS);
  if days == 0 || days as usize > LOGIN_HISTORY_CAP {
    return Err(ApiError::BadRequest(format!(
      "days must be between 1 and {LOGIN_HISTORY_CAP}"
    )));
  }

  let today = params.today.unwrap_or_else(|| utc_day(Utc::now()));
  let history = ledger.get_login_history(id).await?;

  Ok(Json(Heatmap {
    streak: history.streak,
    days:   history.heatmap(today, days),
  }))
}
