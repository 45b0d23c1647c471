//! Async HTTP client wrapping the streak JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use streak_core::{
  activity::ActivityRecord,
  ledger::LoginOutcome,
  user::{HeatmapDay, LoginHistory, UserStreakState},
};
use uuid::Uuid;

/// Connection settings for the streak API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Body of `GET /api/users/:id/heatmap`.
#[derive(Debug, Deserialize)]
pub struct Heatmap {
  pub streak: u32,
  pub days:   Vec<HeatmapDay>,
}

/// Async HTTP client for the streak JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
      let detail = resp.text().await.unwrap_or_default();
      return Err(anyhow!("{what} → {status}: {detail}"));
    }
    resp.json().await.with_context(|| format!("deserialising {what}"))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /api/users`
  pub async fn create_user(&self) -> Result<UserStreakState> {
    let resp = self
      .client
      .post(self.url("/users"))
      .send()
      .await
      .context("POST /users failed")?;
    Self::decode(resp, "POST /users").await
  }

  // ── Logins ────────────────────────────────────────────────────────────────

  /// `POST /api/users/:id/logins`
  pub async fn record_login(
    &self,
    user_id: Uuid,
    at: Option<DateTime<Utc>>,
  ) -> Result<LoginOutcome> {
    let resp = self
      .client
      .post(self.url(&format!("/users/{user_id}/logins")))
      .json(&json!({ "at": at }))
      .send()
      .await
      .context("POST /logins failed")?;
    Self::decode(resp, "POST /logins").await
  }

  /// `GET /api/users/:id/history`
  pub async fn history(&self, user_id: Uuid) -> Result<LoginHistory> {
    let resp = self
      .client
      .get(self.url(&format!("/users/{user_id}/history")))
      .send()
      .await
      .context("GET /history failed")?;
    Self::decode(resp, "GET /history").await
  }

  /// `GET /api/users/:id/heatmap?days=<n>&today=<day>`
  pub async fn heatmap(&self, user_id: Uuid, days: u32, today: NaiveDate) -> Result<Heatmap> {
    let resp = self
      .client
      .get(self.url(&format!("/users/{user_id}/heatmap")))
      .query(&[("days", days.to_string()), ("today", today.to_string())])
      .send()
      .await
      .context("GET /heatmap failed")?;
    Self::decode(resp, "GET /heatmap").await
  }

  // ── Activities ────────────────────────────────────────────────────────────

  /// `GET /api/users/:id/activities?limit=<n>`
  pub async fn activities(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityRecord>> {
    let resp = self
      .client
      .get(self.url(&format!("/users/{user_id}/activities")))
      .query(&[("limit", limit.to_string())])
      .send()
      .await
      .context("GET /activities failed")?;
    Self::decode(resp, "GET /activities").await
  }
}
