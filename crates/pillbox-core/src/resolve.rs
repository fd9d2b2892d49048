//! The recurrence resolver.
//!
//! Answers two questions about a schedule and a calendar date: is a dose due
//! on that date, and if not, how many days until the next one. Dates are
//! naive; day-of-week and day-of-month are read straight off the calendar
//! date with no timezone conversion.
//!
//! [`days_until_next`] only looks at days strictly after `from`. Callers check
//! [`is_due_on`] first and only ask for the distance when it is `false`;
//! [`next_occurrence`] does exactly that.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  medication::Medication,
  schedule::{MedicationSchedule, Recurrence},
  time::{TimeOfDay, Weekday, days_in_month},
};

/// A single resolved dose instance. Computed, never stored.
///
/// Serialises with snake_case keys like every other record the API returns.
/// Only [`TriggerDescriptor`](crate::plan::TriggerDescriptor) and its payload
/// use camelCase, the notification payload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOccurrence {
  pub medication_id: Uuid,
  pub date:          NaiveDate,
  pub time:          TimeOfDay,
  /// 0 means due on the reference date.
  pub days_until:    u32,
}

/// Whether `schedule` has a dose on `date`. Incomplete schedules are never
/// due.
pub fn is_due_on(schedule: &MedicationSchedule, date: NaiveDate) -> bool {
  if !schedule.is_complete() {
    return false;
  }
  match &schedule.recurrence {
    Recurrence::Daily => true,
    Recurrence::Weekly(days) => days.contains(&Weekday::of(date)),
    Recurrence::Monthly(days) => {
      u8::try_from(date.day()).is_ok_and(|day| days.contains(&day))
    }
  }
}

/// Days from `from` to the next scheduled day strictly after it.
///
/// Daily schedules return `Some(0)`. Weekly results fall in `1..=7` and
/// monthly results in `1..=31`. Returns `None` for an incomplete schedule.
///
/// The monthly rollover adds the remaining days of the current month to the
/// smallest scheduled day without checking that the day exists in the next
/// month, so a `31` schedule asked on 28 February answers 3.
pub fn days_until_next(schedule: &MedicationSchedule, from: NaiveDate) -> Option<u32> {
  if !schedule.is_complete() {
    return None;
  }
  match &schedule.recurrence {
    Recurrence::Daily => Some(0),
    Recurrence::Weekly(days) => {
      let today = Weekday::of(from).number_from_sunday();
      // BTreeSet<Weekday> iterates Sunday-first, i.e. in ascending number.
      let mut scheduled = days.iter().map(|d| d.number_from_sunday());
      let first = scheduled.clone().next()?;
      Some(match scheduled.find(|&n| n > today) {
        Some(next) => next - today,
        None => 7 - today + first,
      })
    }
    Recurrence::Monthly(days) => {
      let current = from.day();
      let first = u32::from(*days.first()?);
      Some(match days.iter().map(|&d| u32::from(d)).find(|&d| d > current) {
        Some(next) => next - current,
        None => days_in_month(from.year(), from.month())? - current + first,
      })
    }
  }
}

/// The next dose of `medication` on or after `date`.
///
/// A medication due on `date` resolves to `days_until == 0` at its earliest
/// time of day. Returns `None` if the medication has no complete schedule.
pub fn next_occurrence(medication: &Medication, date: NaiveDate) -> Option<ResolvedOccurrence> {
  let schedule = medication.schedule.as_ref()?;
  let time = *schedule.times.first()?;

  let days_until = if is_due_on(schedule, date) {
    0
  } else {
    days_until_next(schedule, date)?
  };

  Some(ResolvedOccurrence {
    medication_id: medication.medication_id,
    date: date.checked_add_days(Days::new(u64::from(days_until)))?,
    time,
    days_until,
  })
}

/// Every (date, time) dose of `medication` in `[from, from + horizon_days)`,
/// ordered by date then time.
///
/// This walks real calendar dates, so a day-of-month that does not exist in
/// a given month simply produces no occurrence there.
pub fn occurrences(
  medication: &Medication,
  from: NaiveDate,
  horizon_days: u32,
) -> Vec<ResolvedOccurrence> {
  let Some(schedule) = medication.schedule.as_ref().filter(|s| s.is_complete()) else {
    return Vec::new();
  };

  (0..horizon_days)
    .filter_map(|offset| {
      let date = from.checked_add_days(Days::new(u64::from(offset)))?;
      is_due_on(schedule, date).then_some((offset, date))
    })
    .flat_map(|(offset, date)| {
      schedule.times.iter().map(move |&time| ResolvedOccurrence {
        medication_id: medication.medication_id,
        date,
        time,
        days_until: offset,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn t(s: &str) -> TimeOfDay { s.parse().unwrap() }

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  fn medication(schedule: Option<MedicationSchedule>) -> Medication {
    Medication {
      medication_id: Uuid::new_v4(),
      user_id: "user".into(),
      brand_name: "Lisinopril".into(),
      generic_name: None,
      dosage_form: None,
      schedule,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  /// Every date in 2023 and 2024.
  fn two_years() -> impl Iterator<Item = NaiveDate> {
    d(2023, 1, 1).iter_days().take_while(|date| date.year() <= 2024)
  }

  // ── is_due_on ───────────────────────────────────────────────────────────────

  #[test]
  fn daily_is_due_every_day() {
    let schedule = MedicationSchedule::daily([t("08:00")], "10mg");
    assert!(two_years().all(|date| is_due_on(&schedule, date)));
  }

  #[test]
  fn weekly_is_due_exactly_on_listed_weekdays() {
    let schedule =
      MedicationSchedule::weekly([Weekday::Monday, Weekday::Thursday], [t("08:00")], "10mg");
    for date in two_years() {
      let expected = matches!(Weekday::of(date), Weekday::Monday | Weekday::Thursday);
      assert_eq!(is_due_on(&schedule, date), expected, "{date}");
    }
  }

  #[test]
  fn monthly_is_due_on_listed_days_of_month() {
    let schedule = MedicationSchedule::monthly([1, 15], [t("08:00")], "10mg");
    assert!(is_due_on(&schedule, d(2024, 3, 1)));
    assert!(is_due_on(&schedule, d(2024, 3, 15)));
    assert!(!is_due_on(&schedule, d(2024, 3, 14)));
  }

  #[test]
  fn incomplete_schedules_are_never_due() {
    let no_times = MedicationSchedule::daily([], "10mg");
    let no_days = MedicationSchedule::weekly([], [t("08:00")], "10mg");
    assert!(!is_due_on(&no_times, d(2024, 1, 1)));
    assert!(!is_due_on(&no_days, d(2024, 1, 1)));
    assert_eq!(days_until_next(&no_times, d(2024, 1, 1)), None);
    assert_eq!(days_until_next(&no_days, d(2024, 1, 1)), None);
  }

  // ── days_until_next ─────────────────────────────────────────────────────────

  #[test]
  fn weekly_friday_from_tuesday_is_three_days() {
    let schedule = MedicationSchedule::weekly([Weekday::Friday], [t("09:00")], "10mg");
    let tuesday = d(2024, 1, 2);
    assert!(!is_due_on(&schedule, tuesday));
    assert_eq!(days_until_next(&schedule, tuesday), Some(3));
  }

  #[test]
  fn weekly_wraps_into_next_week() {
    let schedule = MedicationSchedule::weekly([Weekday::Monday], [t("09:00")], "10mg");
    // Saturday 2024-01-06 → Monday 2024-01-08.
    assert_eq!(days_until_next(&schedule, d(2024, 1, 6)), Some(2));
  }

  #[test]
  fn weekly_on_a_scheduled_day_looks_past_today() {
    let schedule = MedicationSchedule::weekly([Weekday::Tuesday], [t("09:00")], "10mg");
    assert_eq!(days_until_next(&schedule, d(2024, 1, 2)), Some(7));
  }

  #[test]
  fn weekly_distance_is_one_to_seven_on_non_due_dates() {
    let week: Vec<NaiveDate> = d(2024, 1, 7).iter_days().take(7).collect();
    for mask in 1u8..128 {
      let days = Weekday::ALL
        .into_iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, day)| day);
      let schedule = MedicationSchedule::weekly(days, [t("08:00")], "1mg");
      for &date in &week {
        if is_due_on(&schedule, date) {
          continue;
        }
        let n = days_until_next(&schedule, date).unwrap();
        assert!((1..=7).contains(&n), "mask {mask:#b} on {date}: {n}");
        let target = date + Days::new(u64::from(n));
        assert!(is_due_on(&schedule, target), "mask {mask:#b} on {date} lands on {target}");
      }
    }
  }

  #[test]
  fn monthly_rolls_over_month_end() {
    let schedule = MedicationSchedule::monthly([1], [t("08:00")], "10mg");
    // 28 April (30-day month) → 1 May.
    assert_eq!(days_until_next(&schedule, d(2024, 4, 28)), Some(3));
    // 31 January (31-day month) → 1 February.
    assert_eq!(days_until_next(&schedule, d(2024, 1, 31)), Some(1));
  }

  #[test]
  fn monthly_finds_later_day_in_same_month() {
    let schedule = MedicationSchedule::monthly([5, 20], [t("08:00")], "10mg");
    assert_eq!(days_until_next(&schedule, d(2024, 6, 10)), Some(10));
    assert_eq!(days_until_next(&schedule, d(2024, 6, 25)), Some(30 - 25 + 5));
  }

  #[test]
  fn monthly_rollover_keeps_short_month_approximation() {
    let schedule = MedicationSchedule::monthly([31], [t("08:00")], "10mg");
    assert_eq!(days_until_next(&schedule, d(2023, 2, 28)), Some(3));
  }

  #[test]
  fn monthly_distance_is_one_to_thirty_one_on_non_due_dates() {
    let day_sets: [&[u8]; 5] = [&[1], &[31], &[15, 30], &[2, 9, 28], &[29]];
    for days in day_sets {
      let schedule = MedicationSchedule::monthly(days.iter().copied(), [t("08:00")], "1mg");
      for date in two_years() {
        if is_due_on(&schedule, date) {
          continue;
        }
        let n = days_until_next(&schedule, date).unwrap();
        assert!((1..=31).contains(&n), "{days:?} on {date}: {n}");
      }
    }
  }

  #[test]
  fn daily_distance_is_zero() {
    let schedule = MedicationSchedule::daily([t("08:00")], "10mg");
    assert_eq!(days_until_next(&schedule, d(2024, 1, 1)), Some(0));
  }

  // ── next_occurrence / occurrences ───────────────────────────────────────────

  #[test]
  fn next_occurrence_short_circuits_when_due_today() {
    let med = medication(Some(MedicationSchedule::weekly(
      [Weekday::Tuesday],
      [t("20:00"), t("08:00")],
      "10mg",
    )));
    let tuesday = d(2024, 1, 2);
    let next = next_occurrence(&med, tuesday).unwrap();
    assert_eq!(next.days_until, 0);
    assert_eq!(next.date, tuesday);
    assert_eq!(next.time, t("08:00"));

    let wednesday = d(2024, 1, 3);
    let next = next_occurrence(&med, wednesday).unwrap();
    assert_eq!(next.days_until, 6);
    assert_eq!(next.date, d(2024, 1, 9));
  }

  #[test]
  fn next_occurrence_requires_a_schedule() {
    assert_eq!(next_occurrence(&medication(None), d(2024, 1, 2)), None);
  }

  #[test]
  fn occurrences_cover_each_due_day_and_time() {
    let med = medication(Some(MedicationSchedule::weekly(
      [Weekday::Monday, Weekday::Wednesday],
      [t("21:00"), t("09:00")],
      "10mg",
    )));
    // Sunday 2024-01-07 for two weeks.
    let found = occurrences(&med, d(2024, 1, 7), 14);
    let summary: Vec<(NaiveDate, String, u32)> = found
      .iter()
      .map(|o| (o.date, o.time.to_string(), o.days_until))
      .collect();
    assert_eq!(summary, [
      (d(2024, 1, 8), "09:00".to_string(), 1),
      (d(2024, 1, 8), "21:00".to_string(), 1),
      (d(2024, 1, 10), "09:00".to_string(), 3),
      (d(2024, 1, 10), "21:00".to_string(), 3),
      (d(2024, 1, 15), "09:00".to_string(), 8),
      (d(2024, 1, 15), "21:00".to_string(), 8),
      (d(2024, 1, 17), "09:00".to_string(), 10),
      (d(2024, 1, 17), "21:00".to_string(), 10),
    ]);
    assert!(found.iter().all(|o| o.medication_id == med.medication_id));
  }

  #[test]
  fn occurrences_skip_days_missing_from_short_months() {
    let med = medication(Some(MedicationSchedule::monthly([31], [t("08:00")], "10mg")));
    let found = occurrences(&med, d(2024, 1, 1), 91);
    let dates: Vec<NaiveDate> = found.iter().map(|o| o.date).collect();
    assert_eq!(dates, [d(2024, 1, 31), d(2024, 3, 31)]);
  }

  #[test]
  fn occurrence_keys_match_the_api_records() {
    let med = medication(Some(MedicationSchedule::daily([t("08:00")], "10mg")));
    let occurrence = next_occurrence(&med, d(2024, 1, 1)).unwrap();
    let value = serde_json::to_value(&occurrence).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["date", "days_until", "medication_id", "time"]);
    assert_eq!(value["time"], "08:00");
    assert_eq!(value["days_until"], 0);
  }

  #[test]
  fn occurrences_of_incomplete_schedule_are_empty() {
    let med = medication(Some(MedicationSchedule::monthly([], [t("08:00")], "10mg")));
    assert!(occurrences(&med, d(2024, 1, 1), 31).is_empty());
  }
}
