//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings and dates as `YYYY-MM-DD`.
//! Schedules are stored as compact JSON in their wire form. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use pillbox_core::{
  medication::Medication,
  schedule::{MedicationSchedule, RawSchedule},
  time::{date_key, parse_date_key},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date_key(date) }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date_key(s)?) }

// ─── Schedule ────────────────────────────────────────────────────────────────

pub fn encode_schedule(schedule: &MedicationSchedule) -> Result<String> {
  Ok(serde_json::to_string(&RawSchedule::from(schedule.clone()))?)
}

/// Goes through [`RawSchedule`] so that semantic problems (an unknown
/// frequency, say) surface as [`pillbox_core::Error`] rather than as opaque
/// JSON errors.
pub fn decode_schedule(s: &str) -> Result<MedicationSchedule> {
  let raw: RawSchedule = serde_json::from_str(s)?;
  Ok(MedicationSchedule::try_from(raw)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// The column list matching [`RawMedication`]'s field order.
pub const MEDICATION_COLUMNS: &str = "medication_id, user_id, brand_name, generic_name, \
                                      dosage_form, schedule_json, created_at, updated_at";

/// Raw strings read directly from a `medications` row.
pub struct RawMedication {
  pub medication_id: String,
  pub user_id:       String,
  pub brand_name:    String,
  pub generic_name:  Option<String>,
  pub dosage_form:   Option<String>,
  pub schedule_json: Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawMedication {
  /// Read a row selected with [`MEDICATION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      medication_id: row.get(0)?,
      user_id:       row.get(1)?,
      brand_name:    row.get(2)?,
      generic_name:  row.get(3)?,
      dosage_form:   row.get(4)?,
      schedule_json: row.get(5)?,
      created_at:    row.get(6)?,
      updated_at:    row.get(7)?,
    })
  }

  pub fn into_medication(self) -> Result<Medication> {
    let schedule = self
      .schedule_json
      .as_deref()
      .map(decode_schedule)
      .transpose()?;

    Ok(Medication {
      medication_id: decode_uuid(&self.medication_id)?,
      user_id: self.user_id,
      brand_name: self.brand_name,
      generic_name: self.generic_name,
      dosage_form: self.dosage_form,
      schedule,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
