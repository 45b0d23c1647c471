//! Core types and trait definitions for the streak ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::UserRecordStore`] and
//! [`store::ActivityLog`]; the [`ledger::StreakLedger`] drives them.

pub mod activity;
pub mod error;
pub mod ledger;
pub mod store;
pub mod streak;
pub mod user;

pub use error::{Error, Result};
pub use ledger::StreakLedger;
