//! `pillbox`: command-line client for a Pillbox server.
//!
//! # Usage
//!
//! ```text
//! pillbox --url http://localhost:8080 --user alice today
//! pillbox --config ~/.config/pillbox/config.toml take 6f1c…
//! ```

mod client;
mod render;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use pillbox_core::time::parse_date_key;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pillbox", about = "Command-line client for the Pillbox medication schedule")]
struct Args {
  /// Path to a TOML config file (url, user).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the pillbox server (default: http://localhost:8080).
  #[arg(long, env = "PILLBOX_URL")]
  url: Option<String>,

  /// User whose medications to work with.
  #[arg(long, env = "PILLBOX_USER")]
  user: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List medications with their schedules.
  List,
  /// Show what is due today and what comes next.
  Today {
    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },
  /// Mark a medication as taken.
  Take {
    id: Uuid,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },
  /// Clear a taken mark.
  Untake {
    id: Uuid,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
  },
  /// Show the notification triggers planned for a medication.
  Triggers { id: Uuid },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
  parse_date_key(value).map_err(|e| e.to_string())
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:  String,
  #[serde(default)]
  user: String,
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

  // Load config file if provided.
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
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    user_id:  args
      .user
      .or_else(|| (!file_cfg.user.is_empty()).then(|| file_cfg.user.clone()))
      .ok_or_else(|| anyhow!("no user given; pass --user or set PILLBOX_USER"))?,
  };
  tracing::debug!(?api_config, "resolved connection settings");

  let client = ApiClient::new(api_config)?;
  let today = || Local::now().date_naive();

  match args.command {
    Command::List => {
      let medications = client.list_medications().await?;
      print!("{}", render::medication_list(&medications));
    }
    Command::Today { date } => {
      let ctx = client.context(date.unwrap_or_else(today)).await?;
      print!("{}", render::today(&ctx));
    }
    Command::Take { id, date } => {
      let change = client.mark_taken(date.unwrap_or_else(today), id).await?;
      report(&change, "marked taken", "already marked taken");
    }
    Command::Untake { id, date } => {
      let change = client.unmark_taken(date.unwrap_or_else(today), id).await?;
      report(&change, "taken mark cleared", "was not marked taken");
    }
    Command::Triggers { id } => {
      let triggers = client.triggers(id).await?;
      print!("{}", render::triggers(&triggers));
    }
  }

  Ok(())
}

fn report(change: &client::TakenChange, changed: &str, unchanged: &str) {
  let what = if change.changed { changed } else { unchanged };
  println!("{} on {}: {what}", change.medication_id, change.date);
  tracing::debug!(taken = change.taken, "taken state");
}
