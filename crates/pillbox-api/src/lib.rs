//! JSON REST API for Pillbox.
//!
//! Exposes an axum [`Router`] backed by any [`MedicationStore`] and
//! [`NotificationDispatcher`]. Auth, TLS, and transport concerns are the
//! caller's responsibility; every route is scoped by the `user_id` path
//! segment.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pillbox_api::api_router(store.clone(), dispatcher.clone()))
//! ```

pub mod error;
pub mod medications;
pub mod schedule;
pub mod taken;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use chrono::{Local, NaiveDate};
use pillbox_core::{dispatch::NotificationDispatcher, store::MedicationStore, time::parse_date_key};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, D> {
  pub store:      Arc<S>,
  pub dispatcher: Arc<D>,
}

impl<S, D> Clone for AppState<S, D> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), dispatcher: Arc::clone(&self.dispatcher) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(store: Arc<S>, dispatcher: Arc<D>) -> Router<()>
where
  S: MedicationStore + 'static,
  D: NotificationDispatcher + 'static,
{
  Router::new()
    // Medications
    .route(
      "/users/{user_id}/medications",
      get(medications::list::<S, D>).post(medications::create::<S, D>),
    )
    .route(
      "/users/{user_id}/medications/{id}",
      get(medications::get_one::<S, D>)
        .patch(medications::update::<S, D>)
        .delete(medications::delete_one::<S, D>),
    )
    .route("/users/{user_id}/medications/{id}/triggers", get(medications::triggers::<S, D>))
    .route(
      "/users/{user_id}/medications/{id}/occurrences",
      get(schedule::medication_occurrences::<S, D>),
    )
    // Resolved views
    .route("/users/{user_id}/schedule", get(schedule::schedule::<S, D>))
    .route("/users/{user_id}/context", get(schedule::context::<S, D>))
    // Taken log
    .route("/users/{user_id}/taken", get(taken::list::<S, D>))
    .route(
      "/users/{user_id}/taken/{date}/{id}",
      put(taken::mark::<S, D>).delete(taken::unmark::<S, D>),
    )
    .with_state(AppState { store, dispatcher })
}

// ─── Date parameters ──────────────────────────────────────────────────────────

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
  parse_date_key(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// The requested date, or today in the server's local time zone.
pub(crate) fn resolve_date(value: Option<&str>) -> Result<NaiveDate, ApiError> {
  match value {
    Some(value) => parse_date(value),
    None => Ok(Local::now().date_naive()),
  }
}
