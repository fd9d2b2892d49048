//! Handlers for the resolved views of a user's schedule.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/schedule` | Optional `?date=YYYY-MM-DD` |
//! | `GET`  | `/context` | Optional `?date=YYYY-MM-DD`; JSON plus rendered text |
//! | `GET`  | `/medications/:id/occurrences` | Optional `?from=YYYY-MM-DD&days=N` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use pillbox_core::{
  context::MedicationContext,
  dispatch::NotificationDispatcher,
  group::{ScheduleGroups, UpcomingMedication, group_by_time},
  medication::Medication,
  resolve::{ResolvedOccurrence, occurrences},
  store::MedicationStore,
  taken::TakenLog,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, resolve_date};

/// Horizon used by `/occurrences` when `days` is omitted.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Largest horizon `/occurrences` accepts.
pub const MAX_HORIZON_DAYS: u32 = 366;

#[derive(Debug, Deserialize)]
pub struct DateParams {
  /// Reference date; defaults to today in the server's local time zone.
  pub date: Option<String>,
}

// ─── Schedule ─────────────────────────────────────────────────────────────────

/// A due-today medication with its taken state for the reference date.
#[derive(Debug, Serialize, Deserialize)]
pub struct DueMedication {
  #[serde(flatten)]
  pub medication: Medication,
  pub taken:      bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
  pub date:      NaiveDate,
  pub due_today: Vec<DueMedication>,
  /// Ascending by `days_until`.
  pub upcoming:  Vec<UpcomingMedication>,
}

/// `GET /users/:user_id/schedule[?date=YYYY-MM-DD]`
pub async fn schedule<S, D>(
  State(state): State<AppState<S, D>>,
  Path(user_id): Path<String>,
  Query(params): Query<DateParams>,
) -> Result<Json<ScheduleView>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let date = resolve_date(params.date.as_deref())?;
  let (groups, taken) = load_groups(&state, &user_id, date).await?;

  let due_today = groups
    .due_today
    .into_iter()
    .map(|medication| DueMedication {
      taken: taken.is_taken(date, medication.medication_id),
      medication,
    })
    .collect();

  Ok(Json(ScheduleView { date, due_today, upcoming: groups.upcoming }))
}

// ─── Context ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextView {
  #[serde(flatten)]
  pub context: MedicationContext,
  /// [`MedicationContext::render`] output.
  pub text:    String,
}

/// `GET /users/:user_id/context[?date=YYYY-MM-DD]`
pub async fn context<S, D>(
  State(state): State<AppState<S, D>>,
  Path(user_id): Path<String>,
  Query(params): Query<DateParams>,
) -> Result<Json<ContextView>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let date = resolve_date(params.date.as_deref())?;
  let (groups, taken) = load_groups(&state, &user_id, date).await?;

  let context = MedicationContext::build(&groups, &taken, date);
  let text = context.render();
  Ok(Json(ContextView { context, text }))
}

// ─── Occurrences ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OccurrenceParams {
  pub from: Option<String>,
  pub days: Option<u32>,
}

/// `GET /users/:user_id/medications/:id/occurrences[?from=YYYY-MM-DD][&days=N]`
pub async fn medication_occurrences<S, D>(
  State(state): State<AppState<S, D>>,
  Path((user_id, id)): Path<(String, Uuid)>,
  Query(params): Query<OccurrenceParams>,
) -> Result<Json<Vec<ResolvedOccurrence>>, ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let from = resolve_date(params.from.as_deref())?;
  let days = params.days.unwrap_or(DEFAULT_HORIZON_DAYS);
  if days > MAX_HORIZON_DAYS {
    return Err(ApiError::BadRequest(format!(
      "days must be at most {MAX_HORIZON_DAYS}"
    )));
  }

  let medication = state
    .store
    .get_medication(&user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::medication_not_found(id))?;

  Ok(Json(occurrences(&medication, from, days)))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn load_groups<S, D>(
  state:   &AppState<S, D>,
  user_id: &str,
  date:    NaiveDate,
) -> Result<(ScheduleGroups, TakenLog), ApiError>
where
  S: MedicationStore,
  D: NotificationDispatcher,
{
  let medications = state
    .store
    .list_medications(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let taken = state
    .store
    .taken_on(user_id, date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut groups = group_by_time(&medications, date);
  groups.sort_upcoming();
  Ok((groups, taken))
}
