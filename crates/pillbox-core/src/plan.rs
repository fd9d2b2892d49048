//! The notification trigger planner.
//!
//! Maps a schedule onto recurring trigger descriptors that a platform
//! scheduler can register. A weekly or monthly schedule yields one
//! descriptor per (day, time) pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  medication::Medication,
  schedule::{MedicationSchedule, Recurrence},
  time::TimeOfDay,
};

/// Screen the app opens when a dose notification is tapped.
pub const MEDICATIONS_SCREEN: &str = "medications";

/// The key grouping all descriptors planned for one medication. A dispatcher
/// cancels by this key before re-planning.
pub fn group_key(medication_id: Uuid) -> String { format!("medication:{medication_id}") }

/// How a trigger repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum TriggerRepeat {
  /// Every day.
  Daily,
  /// Once a week; `weekday` is 1 (Sunday) through 7 (Saturday).
  Weekly { weekday: u8 },
  /// Once a month on `day_of_month`.
  Monthly {
    #[serde(rename = "dayOfMonth")]
    day_of_month: u8,
  },
}

/// What the notification shows and where tapping it leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
  pub medication_name: String,
  pub dosage:          String,
  pub screen:          String,
}

/// A declarative recurring alarm, independent of any OS scheduling API.
///
/// Unlike the API records this serialises camelCase (`groupKey`), the shape
/// the notification payload format fixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDescriptor {
  pub group_key: String,
  #[serde(flatten)]
  pub repeat:    TriggerRepeat,
  pub hour:      u8,
  pub minute:    u8,
  pub payload:   TriggerPayload,
}

impl TriggerDescriptor {
  pub fn title(&self) -> String { format!("Time for your {}", self.payload.medication_name) }

  pub fn body(&self) -> String {
    if self.payload.dosage.is_empty() {
      format!("Take your {} now.", self.payload.medication_name)
    } else {
      format!("Take {} of {} now.", self.payload.dosage, self.payload.medication_name)
    }
  }
}

/// Plan every trigger for a schedule.
///
/// Incomplete schedules plan nothing. Output is ordered by time of day,
/// then by day.
pub fn plan_triggers(
  medication_id: Uuid,
  medication_name: &str,
  dosage: &str,
  schedule: &MedicationSchedule,
) -> Vec<TriggerDescriptor> {
  if !schedule.is_complete() {
    return Vec::new();
  }

  let repeats: Vec<TriggerRepeat> = match &schedule.recurrence {
    Recurrence::Daily => vec![TriggerRepeat::Daily],
    Recurrence::Weekly(days) => days
      .iter()
      .map(|d| TriggerRepeat::Weekly { weekday: d.trigger_number() })
      .collect(),
    Recurrence::Monthly(days) => days
      .iter()
      .map(|&day_of_month| TriggerRepeat::Monthly { day_of_month })
      .collect(),
  };

  let key = group_key(medication_id);
  let payload = TriggerPayload {
    medication_name: medication_name.to_owned(),
    dosage:          dosage.to_owned(),
    screen:          MEDICATIONS_SCREEN.to_owned(),
  };

  schedule
    .times
    .iter()
    .flat_map(|&time| repeats.iter().map(move |&repeat| (time, repeat)))
    .map(|(time, repeat): (TimeOfDay, TriggerRepeat)| TriggerDescriptor {
      group_key: key.clone(),
      repeat,
      hour: time.hour(),
      minute: time.minute(),
      payload: payload.clone(),
    })
    .collect()
}

/// Plan triggers for a stored medication, using its display name and the
/// schedule's dosage. A medication without a schedule plans nothing.
pub fn plan_for_medication(medication: &Medication) -> Vec<TriggerDescriptor> {
  match &medication.schedule {
    Some(schedule) => plan_triggers(
      medication.medication_id,
      medication.display_name(),
      &schedule.dosage,
      schedule,
    ),
    None => Vec::new(),
  }
}
