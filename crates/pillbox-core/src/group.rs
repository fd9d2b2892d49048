//! The schedule grouper: splits a user's medications into "due today" and
//! "upcoming" for display and for chat/report context.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  medication::Medication,
  resolve::{days_until_next, is_due_on},
  taken::TakenLog,
};

/// A medication that is not due on the reference date, with the distance to
/// its next dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingMedication {
  #[serde(flatten)]
  pub medication: Medication,
  /// Always at least 1.
  pub days_until: u32,
}

/// Output of [`group_by_time`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGroups {
  /// One entry per medication, however many times of day it has.
  pub due_today: Vec<Medication>,
  /// Unsorted; see [`ScheduleGroups::sort_upcoming`].
  pub upcoming:  Vec<UpcomingMedication>,
}

/// Partition `medications` relative to `date`.
///
/// Medications without a schedule land in neither bucket, and so do
/// incomplete schedules. Every time slot of a due medication shares the one
/// "due today" bucket. Input order is preserved and a repeated id keeps only
/// its first appearance.
pub fn group_by_time<'a, I>(medications: I, date: NaiveDate) -> ScheduleGroups
where
  I: IntoIterator<Item = &'a Medication>,
{
  let mut groups = ScheduleGroups::default();
  let mut seen: HashSet<Uuid> = HashSet::new();

  for medication in medications {
    let Some(schedule) = &medication.schedule else {
      continue;
    };
    if schedule.times.is_empty() || seen.contains(&medication.medication_id) {
      continue;
    }

    if is_due_on(schedule, date) {
      seen.insert(medication.medication_id);
      groups.due_today.push(medication.clone());
    } else if let Some(days_until) = days_until_next(schedule, date).filter(|&n| n > 0) {
      seen.insert(medication.medication_id);
      groups.upcoming.push(UpcomingMedication {
        medication: medication.clone(),
        days_until,
      });
    }
  }

  groups
}

impl ScheduleGroups {
  /// Order `upcoming` by ascending `days_until`, keeping input order among
  /// ties.
  pub fn sort_upcoming(&mut self) {
    self.upcoming.sort_by_key(|u| u.days_until);
  }

  /// Due-today medications not yet marked taken on `date`.
  pub fn pending<'a>(
    &'a self,
    taken: &'a TakenLog,
    date: NaiveDate,
  ) -> impl Iterator<Item = &'a Medication> + 'a {
    self
      .due_today
      .iter()
      .filter(move |m| !taken.is_taken(date, m.medication_id))
  }

  pub fn is_empty(&self) -> bool { self.due_today.is_empty() && self.upcoming.is_empty() }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    schedule::MedicationSchedule,
    time::{TimeOfDay, Weekday},
  };

  fn t(s: &str) -> TimeOfDay { s.parse().unwrap() }

  /// Tuesday.
  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() }

  fn med(name: &str, schedule: Option<MedicationSchedule>) -> Medication {
    Medication {
      medication_id: Uuid::new_v4(),
      user_id: "user".into(),
      brand_name: name.into(),
      generic_name: None,
      dosage_form: None,
      schedule,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn daily_medication_with_two_times_appears_once() {
    let m = med("Metformin", Some(MedicationSchedule::daily([t("08:00"), t("20:00")], "500mg")));
    let groups = group_by_time([&m], today());
    assert_eq!(groups.due_today.len(), 1);
    assert_eq!(groups.due_today[0].medication_id, m.medication_id);
    assert!(groups.upcoming.is_empty());
  }

  #[test]
  fn not_due_medications_are_upcoming_with_distance() {
    let friday = med(
      "Methotrexate",
      Some(MedicationSchedule::weekly([Weekday::Friday], [t("09:00")], "2.5mg")),
    );
    let first = med("Vitamin D", Some(MedicationSchedule::monthly([1], [t("08:00")], "1000IU")));
    let groups = group_by_time([&friday, &first], today());

    assert!(groups.due_today.is_empty());
    let distances: Vec<(Uuid, u32)> = groups
      .upcoming
      .iter()
      .map(|u| (u.medication.medication_id, u.days_until))
      .collect();
    // January has 31 days: 31 - 2 + 1.
    assert_eq!(distances, [(friday.medication_id, 3), (first.medication_id, 30)]);
  }

  #[test]
  fn unscheduled_and_incomplete_medications_are_skipped() {
    let none = med("Ibuprofen", None);
    let empty_days = med("Prednisone", Some(MedicationSchedule::weekly([], [t("08:00")], "5mg")));
    let empty_times = med("Zinc", Some(MedicationSchedule::daily([], "50mg")));
    let groups = group_by_time([&none, &empty_days, &empty_times], today());
    assert!(groups.is_empty());
  }

  #[test]
  fn duplicate_ids_keep_first_appearance() {
    let m = med(
      "Alendronate",
      Some(MedicationSchedule::weekly([Weekday::Sunday], [t("07:00"), t("19:00")], "70mg")),
    );
    let mut copy = m.clone();
    copy.brand_name = "Fosamax".into();
    let groups = group_by_time([&m, &copy], today());
    assert_eq!(groups.upcoming.len(), 1);
    assert_eq!(groups.upcoming[0].medication.brand_name, "Alendronate");
    assert_eq!(groups.upcoming[0].days_until, 5);
  }

  #[test]
  fn sort_upcoming_orders_by_distance() {
    let far = med("Far", Some(MedicationSchedule::weekly([Weekday::Monday], [t("08:00")], "1mg")));
    let near = med("Near", Some(MedicationSchedule::weekly([Weekday::Wednesday], [t("08:00")], "1mg")));
    let mut groups = group_by_time([&far, &near], today());
    assert_eq!(groups.upcoming[0].medication.brand_name, "Far");
    groups.sort_upcoming();
    let order: Vec<u32> = groups.upcoming.iter().map(|u| u.days_until).collect();
    assert_eq!(order, [1, 6]);
  }

  #[test]
  fn pending_excludes_taken_medications() {
    let a = med("A", Some(MedicationSchedule::daily([t("08:00")], "1mg")));
    let b = med("B", Some(MedicationSchedule::daily([t("09:00")], "1mg")));
    let groups = group_by_time([&a, &b], today());

    let mut taken = TakenLog::new();
    taken.mark(today(), a.medication_id);
    let pending: Vec<&str> = groups.pending(&taken, today()).map(|m| m.brand_name.as_str()).collect();
    assert_eq!(pending, ["B"]);
  }

  #[test]
  fn upcoming_serialises_flat_with_days_until() {
    let m = med("Weekly", Some(MedicationSchedule::weekly([Weekday::Friday], [t("09:00")], "1mg")));
    let groups = group_by_time([&m], today());
    let value = serde_json::to_value(&groups).unwrap();
    assert_eq!(value["upcoming"][0]["brand_name"], "Weekly");
    assert_eq!(value["upcoming"][0]["days_until"], 3);
  }
}
