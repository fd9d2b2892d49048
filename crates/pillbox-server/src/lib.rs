//! HTTP server assembly for Pillbox.
//!
//! Mounts the JSON API under `/api` with request tracing, backed by any
//! [`MedicationStore`] and the in-process notification dispatcher.

pub mod dispatch;

pub use dispatch::InProcessDispatcher;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use pillbox_core::{dispatch::NotificationDispatcher, store::MedicationStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PILLBOX_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/pillbox/pillbox.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: `/health` plus the API under `/api`.
pub fn router<S, D>(store: Arc<S>, dispatcher: Arc<D>) -> Router
where
  S: MedicationStore + 'static,
  D: NotificationDispatcher + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", pillbox_api::api_router(store, dispatcher))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
