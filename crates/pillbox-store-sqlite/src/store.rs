//! [`SqliteStore`], the SQLite implementation of [`MedicationStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pillbox_core::{
  medication::{Medication, MedicationPatch, NewMedication},
  store::MedicationStore,
  taken::TakenLog,
};

use crate::{
  encode::{
    MEDICATION_COLUMNS, RawMedication, decode_date, decode_uuid, encode_date, encode_dt,
    encode_schedule, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pillbox medication store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write every mutable column of `medication` back to its row.
  async fn write_medication(&self, medication: &Medication) -> Result<bool> {
    let id_str        = encode_uuid(medication.medication_id);
    let user_id       = medication.user_id.clone();
    let brand_name    = medication.brand_name.clone();
    let generic_name  = medication.generic_name.clone();
    let dosage_form   = medication.dosage_form.clone();
    let schedule_json = medication.schedule.as_ref().map(encode_schedule).transpose()?;
    let updated_str   = encode_dt(medication.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE medications
              SET brand_name = ?3, generic_name = ?4, dosage_form = ?5,
                  schedule_json = ?6, updated_at = ?7
            WHERE medication_id = ?1 AND user_id = ?2",
          rusqlite::params![
            id_str,
            user_id,
            brand_name,
            generic_name,
            dosage_form,
            schedule_json,
            updated_str,
          ],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── MedicationStore impl ────────────────────────────────────────────────────

impl MedicationStore for SqliteStore {
  type Error = Error;

  // ── Medications ───────────────────────────────────────────────────────────

  async fn list_medications(&self, user_id: &str) -> Result<Vec<Medication>> {
    let user_id = user_id.to_owned();

    let raws: Vec<RawMedication> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEDICATION_COLUMNS} FROM medications
            WHERE user_id = ?1
            ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawMedication::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMedication::into_medication).collect()
  }

  async fn get_medication(&self, user_id: &str, medication_id: Uuid) -> Result<Option<Medication>> {
    let user_id = user_id.to_owned();
    let id_str  = encode_uuid(medication_id);

    let raw: Option<RawMedication> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {MEDICATION_COLUMNS} FROM medications
                WHERE medication_id = ?1 AND user_id = ?2"
            ),
            rusqlite::params![id_str, user_id],
            RawMedication::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMedication::into_medication).transpose()
  }

  async fn create_medication(&self, user_id: &str, input: NewMedication) -> Result<Medication> {
    let now = Utc::now();
    let medication = Medication {
      medication_id: Uuid::new_v4(),
      user_id:       user_id.to_owned(),
      brand_name:    input.brand_name,
      generic_name:  input.generic_name,
      dosage_form:   input.dosage_form,
      schedule:      input.schedule,
      created_at:    now,
      updated_at:    now,
    };

    let id_str        = encode_uuid(medication.medication_id);
    let user_id       = medication.user_id.clone();
    let brand_name    = medication.brand_name.clone();
    let generic_name  = medication.generic_name.clone();
    let dosage_form   = medication.dosage_form.clone();
    let schedule_json = medication.schedule.as_ref().map(encode_schedule).transpose()?;
    let at_str        = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO medications (
             medication_id, user_id, brand_name, generic_name, dosage_form,
             schedule_json, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            user_id,
            brand_name,
            generic_name,
            dosage_form,
            schedule_json,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(medication)
  }

  async fn update_medication(
    &self,
    user_id:       &str,
    medication_id: Uuid,
    patch:         MedicationPatch,
  ) -> Result<Option<Medication>> {
    let mut medication = match self.get_medication(user_id, medication_id).await? {
      Some(m) => m,
      None    => return Ok(None),
    };

    patch.apply(&mut medication);
    medication.updated_at = Utc::now();

    if !self.write_medication(&medication).await? {
      // Deleted between the read and the write.
      return Ok(None);
    }
    Ok(Some(medication))
  }

  async fn delete_medication(&self, user_id: &str, medication_id: Uuid) -> Result<bool> {
    let user_id = user_id.to_owned();
    let id_str  = encode_uuid(medication_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM taken_doses WHERE medication_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_id],
        )?;
        let n = tx.execute(
          "DELETE FROM medications WHERE medication_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_id],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Taken-dose log ────────────────────────────────────────────────────────

  async fn mark_taken(&self, user_id: &str, date: NaiveDate, medication_id: Uuid) -> Result<bool> {
    let user_id  = user_id.to_owned();
    let date_str = encode_date(date);
    let id_str   = encode_uuid(medication_id);
    let at_str   = encode_dt(Utc::now());

    // `None` when the medication is not visible to this user.
    let inserted: Option<bool> = self
      .conn
      .call(move |conn| {
        let owned = conn
          .query_row(
            "SELECT 1 FROM medications WHERE medication_id = ?1 AND user_id = ?2",
            rusqlite::params![id_str, user_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !owned {
          return Ok(None);
        }

        let n = conn.execute(
          "INSERT OR IGNORE INTO taken_doses (user_id, date_key, medication_id, recorded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id, date_str, id_str, at_str],
        )?;
        Ok(Some(n > 0))
      })
      .await?;

    inserted.ok_or(Error::MedicationNotFound(medication_id))
  }

  async fn unmark_taken(&self, user_id: &str, date: NaiveDate, medication_id: Uuid) -> Result<bool> {
    let user_id  = user_id.to_owned();
    let date_str = encode_date(date);
    let id_str   = encode_uuid(medication_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM taken_doses
            WHERE user_id = ?1 AND date_key = ?2 AND medication_id = ?3",
          rusqlite::params![user_id, date_str, id_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn taken_on(&self, user_id: &str, date: NaiveDate) -> Result<TakenLog> {
    let user_id  = user_id.to_owned();
    let date_str = encode_date(date);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date_key, medication_id FROM taken_doses
            WHERE user_id = ?1 AND date_key = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, date_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .iter()
      .map(|(date, id)| -> Result<(NaiveDate, Uuid)> {
        Ok((decode_date(date)?, decode_uuid(id)?))
      })
      .collect()
  }
}
