//! Handlers for the taken-dose log.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/taken` | Optional `?date=YYYY-MM-DD` |
//! | `PUT`    | `/taken/:date/:id` | Idempotent; 404 for an unknown medication |
//! | `DELETE` | `/taken/:date/:id` | Idempotent |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use pillbox_core::{dispatch::NotificationDispatcher, store::MedicationStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, parse_date, resolve_date, schedule::DateParams};

#[derive(Debug, Serialize, Deserialize)]
pub struct TakenDay {
  pub date:           NaiveDate,
  pub medication_ids: Vec<Uuid>,
}

/// Result of a mark or unmark.
#[derive(Debug, Serialize, Deserialize)]
pub struct TakenChange {
  pub date:          NaiveDate,
  pub medication_id: Uuid,
  pub taken:         bool,
  /// `false` when the mark was already in the requested state.
  pub changed:       bool,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/taken[?date=YYYY-MM-DD]`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
  Path(user_id): Path<String>,
  Query(params): Query<DateParams>,
) -> Result<Json<TakenDay>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let date = resolve_date(params.date.as_deref())?;
  let log = state
    .store
    .taken_on(&user_id, date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(TakenDay { date, medication_ids: log.taken_on(date).collect() }))
}

// ─── Mark / unmark ────────────────────────────────────────────────────────────

/// `PUT /users/:user_id/taken/:date/:id`
pub async fn mark<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, date, id)): Path<(String, String, Uuid)>,
) -> Result<Json<TakenChange>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let date = parse_date(&date)?;

  // The store reports a foreign id as an error; surface it as a 404 instead.
  state
    .store
    .get_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::medication_not_found(id))?;

  let changed = state
    .store
    .mark_taken(&user_id, date, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::debug!(user_id = %user_id, medication_id = %id, %date, changed, "marked taken");

  Ok(Json(TakenChange { date, medication_id: id, taken: true, changed }))
}

/// `DELETE /users/:user_id/taken/:date/:id`
pub async fn unmark<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, date, id)): Path<(String, String, Uuid)>,
) -> Result<Json<TakenChange>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let date = parse_date(&date)?;
  let changed = state
    .store
    .unmark_taken(&user_id, date, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::debug!(user_id = %user_id, medication_id = %id, %date, changed, "unmarked taken");

  Ok(Json(TakenChange { date, medication_id: id, taken: false, changed }))
}
