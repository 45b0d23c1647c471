//! `GET /users/:id/activities[?limit=N]` — the user's activity feed, newest
//! first. Defaults to 50 records, capped at 500.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use streak_core::{
  activity::ActivityRecord,
  store::{ActivityLog, UserRecordStore},
};
use uuid::Uuid;

use crate::{Ledger, error::ApiError};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

pub async fn list<S>(
  State(ledger): State<Arc<Ledger<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError>
where
  S: UserRecordStore + ActivityLog,
{
  ledger
    .users()
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
  let records = ledger
    .activities()
    .recent(id, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}
