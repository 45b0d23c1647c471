//! JSON REST API for the streak ledger.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`UserRecordStore`] and [`ActivityLog`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", streak_api::api_router(ledger.clone()))
//! ```

pub mod activities;
pub mod error;
pub mod logins;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use streak_core::{
  StreakLedger,
  store::{ActivityLog, UserRecordStore},
};

pub use error::ApiError;

/// A ledger whose user store and activity log are the same backend.
pub type Ledger<S> = StreakLedger<S, S>;

/// Build a fully-materialised API router for `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(ledger: Arc<Ledger<S>>) -> Router<()>
where
  S: UserRecordStore + ActivityLog + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Logins
    .route("/users/{id}/logins", post(logins::record::<S>))
    .route("/users/{id}/history", get(logins::history::<S>))
    .route("/users/{id}/heatmap", get(logins::heatmap::<S>))
    // Activity feed
    .route("/users/{id}/activities", get(activities::list::<S>))
    .with_state(ledger)
}
