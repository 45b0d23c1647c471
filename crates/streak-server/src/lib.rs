//! HTTP server assembly for the streak ledger.
//!
//! Nests the [`streak_api`] router under `/api`, adds a liveness probe and
//! request tracing. Configuration is read by the binary.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use streak_api::Ledger;
use streak_core::store::{ActivityLog, UserRecordStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `STREAK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5240 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/streak/streak.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(ledger: Arc<Ledger<S>>) -> Router
where
  S: UserRecordStore + ActivityLog + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", streak_api::api_router(ledger))
    .layer(TraceLayer::new_for_http())
}
