//! Medication records.
//!
//! A medication belongs to exactly one user. The store enforces that scoping
//! with a query filter; nothing in the core inspects `user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::MedicationSchedule;

/// A persisted medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
  /// Store-assigned; stable for the record's lifetime.
  pub medication_id: Uuid,
  pub user_id:       String,
  pub brand_name:    String,
  pub generic_name:  Option<String>,
  /// e.g. "tablet", "oral suspension", "inhaler".
  pub dosage_form:   Option<String>,
  /// Absent while the add-medication flow is still in progress.
  pub schedule:      Option<MedicationSchedule>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Medication {
  /// The name shown to the user: the brand name, or the generic name when
  /// no brand name was recorded.
  pub fn display_name(&self) -> &str {
    match &self.generic_name {
      Some(generic) if self.brand_name.trim().is_empty() => generic,
      _ => &self.brand_name,
    }
  }
}

/// Input to [`crate::store::MedicationStore::create_medication`].
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMedication {
  pub brand_name:   String,
  #[serde(default)]
  pub generic_name: Option<String>,
  #[serde(default)]
  pub dosage_form:  Option<String>,
  #[serde(default)]
  pub schedule:     Option<MedicationSchedule>,
}

impl NewMedication {
  pub fn new(brand_name: impl Into<String>) -> Self {
    Self { brand_name: brand_name.into(), ..Self::default() }
  }

  pub fn with_schedule(mut self, schedule: MedicationSchedule) -> Self {
    self.schedule = Some(schedule);
    self
  }
}

/// An explicit update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationPatch {
  #[serde(default)]
  pub brand_name:   Option<String>,
  #[serde(default)]
  pub generic_name: Option<String>,
  #[serde(default)]
  pub dosage_form:  Option<String>,
  #[serde(default)]
  pub schedule:     Option<MedicationSchedule>,
}

impl MedicationPatch {
  pub fn is_empty(&self) -> bool {
    self.brand_name.is_none()
      && self.generic_name.is_none()
      && self.dosage_form.is_none()
      && self.schedule.is_none()
  }

  /// Apply the patch in place. Does not touch `updated_at`.
  pub fn apply(self, medication: &mut Medication) {
    if let Some(brand_name) = self.brand_name {
      medication.brand_name = brand_name;
    }
    if let Some(generic_name) = self.generic_name {
      medication.generic_name = Some(generic_name);
    }
    if let Some(dosage_form) = self.dosage_form {
      medication.dosage_form = Some(dosage_form);
    }
    if let Some(schedule) = self.schedule {
      medication.schedule = Some(schedule);
    }
  }
}
