//! `streak` — command-line client for the streak server.
//!
//! # Usage
//!
//! ```
//! streak --url http://localhost:5240 new-user
//! streak login 1c9f…
//! streak heatmap 1c9f… --days 30
//! ```

mod client;
mod render;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use streak_core::{
  streak::{StreakChange, utc_day},
  user::HEATMAP_DAYS,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "streak", about = "Command-line client for the streak server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the streak server (default: http://localhost:5240).
  #[arg(long, env = "STREAK_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a user record and print its id.
  NewUser,
  /// Record a login, now or at `--at`.
  Login {
    user: Uuid,
    /// RFC 3339 instant, e.g. 2024-03-11T23:59:00Z.
    #[arg(long)]
    at:   Option<DateTime<Utc>>,
  },
  /// Print the stored login days and streak.
  History { user: Uuid },
  /// Draw the login heatmap ending today.
  Heatmap {
    user: Uuid,
    #[arg(long, default_value_t = HEATMAP_DAYS)]
    days: u32,
  },
  /// Print recent activity records, newest first.
  Activities {
    user:  Uuid,
    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:5240".to_string()),
  };
  tracing::debug!(base_url = %api_config.base_url, "using server");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::NewUser => {
      let user = client.create_user().await?;
      println!("{}", user.user_id);
    }
    Command::Login { user, at } => {
      let outcome = client.record_login(user, at).await?;
      let note = match outcome.change {
        StreakChange::Started => "streak started".to_string(),
        StreakChange::Extended => "streak extended".to_string(),
        StreakChange::Reset { previous } => format!("lost a {previous} day streak"),
        StreakChange::Unchanged => "already logged in today".to_string(),
      };
      println!("streak: {} ({note})", outcome.current_streak);
    }
    Command::History { user } => {
      let history = client.history(user).await?;
      for d in &history.login_dates {
        println!("{d}");
      }
      println!("streak: {}", history.streak);
    }
    Command::Heatmap { user, days } => {
      let map = client.heatmap(user, days, utc_day(Utc::now())).await?;
      println!("{}", render::heatmap(map.streak, &map.days));
    }
    Command::Activities { user, limit } => {
      for record in client.activities(user, limit).await? {
        println!("{}", render::activity(&record));
      }
    }
  }
  Ok(())
}
