//! The `MedicationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `pillbox-store-sqlite`).
//! Higher layers (`pillbox-api`, `pillbox-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  medication::{Medication, MedicationPatch, NewMedication},
  taken::TakenLog,
};

/// Abstraction over a medication store backend.
///
/// Every operation is scoped to one user; a medication owned by another user
/// behaves exactly like a missing one.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait MedicationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Medications ───────────────────────────────────────────────────────

  /// All of a user's medications, oldest first.
  fn list_medications<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Medication>, Self::Error>> + Send + 'a;

  /// Retrieve one medication. Returns `None` if not found.
  fn get_medication<'a>(
    &'a self,
    user_id: &'a str,
    medication_id: Uuid,
  ) -> impl Future<Output = Result<Option<Medication>, Self::Error>> + Send + 'a;

  /// Persist a new medication. The id and timestamps are set by the store.
  fn create_medication<'a>(
    &'a self,
    user_id: &'a str,
    input: NewMedication,
  ) -> impl Future<Output = Result<Medication, Self::Error>> + Send + 'a;

  /// Apply `patch` and bump `updated_at`. Returns `None` if not found.
  fn update_medication<'a>(
    &'a self,
    user_id: &'a str,
    medication_id: Uuid,
    patch: MedicationPatch,
  ) -> impl Future<Output = Result<Option<Medication>, Self::Error>> + Send + 'a;

  /// Delete immediately, together with the medication's taken marks.
  /// Returns `false` if there was nothing to delete.
  fn delete_medication<'a>(
    &'a self,
    user_id: &'a str,
    medication_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Taken-dose log ────────────────────────────────────────────────────

  /// Mark a medication taken on `date`. Returns `false` if it already was.
  fn mark_taken<'a>(
    &'a self,
    user_id: &'a str,
    date: NaiveDate,
    medication_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove a taken mark. Returns `false` if there was none.
  fn unmark_taken<'a>(
    &'a self,
    user_id: &'a str,
    date: NaiveDate,
    medication_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The user's taken marks for `date`.
  fn taken_on<'a>(
    &'a self,
    user_id: &'a str,
    date: NaiveDate,
  ) -> impl Future<Output = Result<TakenLog, Self::Error>> + Send + 'a;
}
