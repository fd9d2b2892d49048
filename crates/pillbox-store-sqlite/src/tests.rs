//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use pillbox_core::{
  medication::{MedicationPatch, NewMedication},
  schedule::MedicationSchedule,
  store::MedicationStore,
  time::{TimeOfDay, Weekday},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t(s: &str) -> TimeOfDay { s.parse().unwrap() }

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

fn lisinopril() -> NewMedication {
  NewMedication::new("Lisinopril").with_schedule(MedicationSchedule::daily(
    [t("08:00"), t("20:00")],
    "10mg",
  ))
}

// ─── Medications ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_medication() {
  let s = store().await;

  let created = s.create_medication("alice", lisinopril()).await.unwrap();
  assert_eq!(created.user_id, "alice");
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s
    .get_medication("alice", created.medication_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.medication_id, created.medication_id);
  assert_eq!(fetched.brand_name, "Lisinopril");
  assert_eq!(fetched.schedule, created.schedule);
}

#[tokio::test]
async fn get_medication_missing_returns_none() {
  let s = store().await;
  let result = s.get_medication("alice", Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn medication_without_schedule_roundtrips() {
  let s = store().await;

  let mut input = NewMedication::new("Ventolin");
  input.generic_name = Some("salbutamol".into());
  input.dosage_form = Some("inhaler".into());
  let created = s.create_medication("alice", input).await.unwrap();

  let fetched = s
    .get_medication("alice", created.medication_id)
    .await
    .unwrap()
    .unwrap();
  assert!(fetched.schedule.is_none());
  assert_eq!(fetched.generic_name.as_deref(), Some("salbutamol"));
  assert_eq!(fetched.dosage_form.as_deref(), Some("inhaler"));
}

#[tokio::test]
async fn list_is_oldest_first() {
  let s = store().await;

  let first = s.create_medication("alice", lisinopril()).await.unwrap();
  let second = s
    .create_medication("alice", NewMedication::new("Aspirin"))
    .await
    .unwrap();

  let ids: Vec<_> = s
    .list_medications("alice")
    .await
    .unwrap()
    .into_iter()
    .map(|m| m.medication_id)
    .collect();
  assert_eq!(ids, [first.medication_id, second.medication_id]);
}

#[tokio::test]
async fn medications_are_scoped_to_their_user() {
  let s = store().await;

  let alices = s.create_medication("alice", lisinopril()).await.unwrap();
  s.create_medication("bob", NewMedication::new("Aspirin"))
    .await
    .unwrap();

  let listed = s.list_medications("alice").await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].medication_id, alices.medication_id);

  // Another user's id behaves like a missing one.
  assert!(
    s.get_medication("bob", alices.medication_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(
    s.update_medication("bob", alices.medication_id, MedicationPatch::default())
      .await
      .unwrap()
      .is_none()
  );
  assert!(!s.delete_medication("bob", alices.medication_id).await.unwrap());
  assert!(
    s.get_medication("alice", alices.medication_id)
      .await
      .unwrap()
      .is_some()
  );
}

#[tokio::test]
async fn update_applies_patch_and_bumps_timestamp() {
  let s = store().await;
  let created = s.create_medication("alice", lisinopril()).await.unwrap();

  let weekly = MedicationSchedule::weekly(
    [Weekday::Monday, Weekday::Thursday],
    [t("09:30")],
    "20mg",
  );
  let patch = MedicationPatch {
    dosage_form: Some("tablet".into()),
    schedule: Some(weekly.clone()),
    ..Default::default()
  };

  let updated = s
    .update_medication("alice", created.medication_id, patch)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.brand_name, "Lisinopril");
  assert_eq!(updated.dosage_form.as_deref(), Some("tablet"));
  assert!(updated.updated_at >= created.updated_at);

  let fetched = s
    .get_medication("alice", created.medication_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.schedule, Some(weekly));
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn monthly_schedule_roundtrips() {
  let s = store().await;

  let monthly = MedicationSchedule::monthly([1, 15, 31], [t("07:00")], "1000IU");
  let created = s
    .create_medication("alice", NewMedication::new("Vitamin D").with_schedule(monthly.clone()))
    .await
    .unwrap();

  let fetched = s
    .get_medication("alice", created.medication_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.schedule, Some(monthly));
}

#[tokio::test]
async fn delete_removes_medication_and_taken_marks() {
  let s = store().await;
  let created = s.create_medication("alice", lisinopril()).await.unwrap();
  s.mark_taken("alice", day(4), created.medication_id)
    .await
    .unwrap();

  assert!(s.delete_medication("alice", created.medication_id).await.unwrap());
  assert!(
    s.get_medication("alice", created.medication_id)
      .await
      .unwrap()
      .is_none()
  );
  assert!(s.taken_on("alice", day(4)).await.unwrap().is_empty());

  // Second delete is a no-op.
  assert!(!s.delete_medication("alice", created.medication_id).await.unwrap());
}

// ─── Taken-dose log ──────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_taken_is_idempotent() {
  let s = store().await;
  let med = s.create_medication("alice", lisinopril()).await.unwrap();

  assert!(s.mark_taken("alice", day(4), med.medication_id).await.unwrap());
  assert!(!s.mark_taken("alice", day(4), med.medication_id).await.unwrap());

  let log = s.taken_on("alice", day(4)).await.unwrap();
  assert!(log.is_taken(day(4), med.medication_id));
  assert_eq!(log.taken_on(day(4)).count(), 1);
}

#[tokio::test]
async fn taken_marks_are_per_date() {
  let s = store().await;
  let med = s.create_medication("alice", lisinopril()).await.unwrap();

  s.mark_taken("alice", day(4), med.medication_id).await.unwrap();

  let next_day = s.taken_on("alice", day(5)).await.unwrap();
  assert!(next_day.is_empty());
  assert!(!next_day.is_taken(day(5), med.medication_id));
}

#[tokio::test]
async fn unmark_taken() {
  let s = store().await;
  let med = s.create_medication("alice", lisinopril()).await.unwrap();

  assert!(!s.unmark_taken("alice", day(4), med.medication_id).await.unwrap());
  s.mark_taken("alice", day(4), med.medication_id).await.unwrap();
  assert!(s.unmark_taken("alice", day(4), med.medication_id).await.unwrap());
  assert!(s.taken_on("alice", day(4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_taken_on_foreign_medication_errors() {
  let s = store().await;
  let med = s.create_medication("alice", lisinopril()).await.unwrap();

  let err = s
    .mark_taken("bob", day(4), med.medication_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MedicationNotFound(id) if id == med.medication_id));

  let err = s
    .mark_taken("alice", day(4), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MedicationNotFound(_)));
}

#[tokio::test]
async fn taken_log_is_scoped_to_user() {
  let s = store().await;
  let alices = s.create_medication("alice", lisinopril()).await.unwrap();
  let bobs = s.create_medication("bob", lisinopril()).await.unwrap();

  s.mark_taken("alice", day(4), alices.medication_id).await.unwrap();
  s.mark_taken("bob", day(4), bobs.medication_id).await.unwrap();

  let log = s.taken_on("alice", day(4)).await.unwrap();
  let ids: Vec<_> = log.taken_on(day(4)).collect();
  assert_eq!(ids, [alices.medication_id]);
}
