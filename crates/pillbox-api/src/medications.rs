//! Handlers for `/users/{user_id}/medications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/medications` | Oldest first |
//! | `POST`   | `/medications` | Body: [`NewMedication`]; returns 201, 422 on an incomplete schedule |
//! | `GET`    | `/medications/:id` | 404 if not found |
//! | `PATCH`  | `/medications/:id` | Body: [`MedicationPatch`]; 422 on an incomplete schedule |
//! | `DELETE` | `/medications/:id` | 204; cancels triggers |
//! | `GET`    | `/medications/:id/triggers` | Planned trigger descriptors |
//!
//! Every write that can change a schedule re-plans the medication's
//! notifications through the dispatcher.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pillbox_core::{
  dispatch::{NotificationDispatcher, reschedule, unschedule},
  medication::{Medication, MedicationPatch, NewMedication},
  plan::{TriggerDescriptor, plan_for_medication},
  schedule::MedicationSchedule,
  store::MedicationStore,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/medications`
pub async fn list<S, D>(
  State(state): State<AppState<S, D>>,
  Path(user_id): Path<String>,
) -> Result<Json<Vec<Medication>>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let medications = state
    .store
    .list_medications(&user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(medications))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users/:user_id/medications`
///
/// The schedule may be absent while the add flow is still in progress, and
/// nothing is planned for such a medication. A schedule that is present must
/// be complete.
pub async fn create<S, D>(
  State(state): State<AppState<S, D>>,
  Path(user_id): Path<String>,
  Json(body): Json<NewMedication>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  if body.brand_name.trim().is_empty()
    && body.generic_name.as_deref().is_none_or(|g| g.trim().is_empty())
  {
    return Err(ApiError::BadRequest("a brand or generic name is required".into()));
  }
  check_schedule(body.schedule.as_ref())?;

  let medication = state
    .store
    .create_medication(&user_id, body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let planned = replan(state.dispatcher.as_ref(), &medication).await?;
  tracing::info!(
    user_id = %user_id,
    medication_id = %medication.medication_id,
    planned,
    "medication created"
  );

  Ok((StatusCode::CREATED, Json(medication)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/medications/:id`
pub async fn get_one<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Medication>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let medication = state
    .store
    .get_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::medication_not_found(id))?;
  Ok(Json(medication))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /users/:user_id/medications/:id`
pub async fn update<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, id)): Path<(String, Uuid)>,
  Json(patch): Json<MedicationPatch>,
) -> Result<Json<Medication>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  if patch.is_empty() {
    return Err(ApiError::BadRequest("patch has no fields".into()));
  }
  check_schedule(patch.schedule.as_ref())?;

  let medication = state
    .store
    .update_medication(&user_id, id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::medication_not_found(id))?;

  let planned = replan(state.dispatcher.as_ref(), &medication).await?;

  // A DELETE may have landed between the write above and the re-plan.
  let still_stored = state
    .store
    .get_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some();
  if !still_stored {
    unschedule(state.dispatcher.as_ref(), id)
      .await
      .map_err(|e| ApiError::Dispatch(Box::new(e)))?;
    tracing::info!(user_id = %user_id, medication_id = %id, "medication deleted during update");
    return Err(ApiError::medication_not_found(id));
  }
  tracing::info!(user_id = %user_id, medication_id = %id, planned, "medication updated");

  Ok(Json(medication))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:user_id/medications/:id`
pub async fn delete_one<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let deleted = state
    .store
    .delete_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::medication_not_found(id));
  }

  let cancelled = unschedule(state.dispatcher.as_ref(), id)
    .await
    .map_err(|e| ApiError::Dispatch(Box::new(e)))?;
  tracing::info!(user_id = %user_id, medication_id = %id, cancelled, "medication deleted");

  Ok(StatusCode::NO_CONTENT)
}

// ─── Triggers ─────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/medications/:id/triggers`
pub async fn triggers<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<TriggerDescriptor>>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let medication = state
    .store
    .get_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::medication_not_found(id))?;
  Ok(Json(plan_for_medication(&medication)))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Reject a schedule that could not be planned.
fn check_schedule(schedule: Option<&MedicationSchedule>) -> Result<(), ApiError> {
  match schedule {
    Some(schedule) if !schedule.is_complete() => Err(ApiError::Unprocessable(
      "schedule needs at least one time and, unless daily, at least one day".into(),
    )),
    _ => Ok(()),
  }
}

/// Replace the medication's registered triggers with a fresh plan. A
/// medication without a schedule leaves the group empty.
async fn replan<D>(dispatcher: &D, medication: &Medication) -> Result<usize, ApiError>
where
  D: NotificationDispatcher,
{
  reschedule(dispatcher, medication)
    .await
    .map_err(|e| ApiError::Dispatch(Box::new(e)))
}
