//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users` | All user records |
//! | `POST` | `/users` | Creates a record with default streak fields; 201 |
//! | `GET`  | `/users/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use streak_core::{
  store::{ActivityLog, UserRecordStore},
  user::UserStreakState,
};
use uuid::Uuid;

use crate::{Ledger, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<Json<Vec<UserStreakState>>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  let users = ledger.users().list().await.map_err(ApiError::store)?;
  Ok(Json(users))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create<S>(
  State(ledger): State<Arc<Ledger<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  let user = ledger.users().create().await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UserStreakState>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  let user = ledger
    .users()
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}
