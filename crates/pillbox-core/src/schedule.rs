//! Recurring dose schedules.
//!
//! On the wire (and in persisted documents) a schedule is the flat
//! `{frequency, days, times, dosage}` shape in which the meaning of `days`
//! depends on `frequency`. In memory it is a [`Recurrence`] tagged union, so
//! a weekday name can never be mistaken for a day of the month.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  time::{TimeOfDay, Weekday},
};

// ─── Frequency ───────────────────────────────────────────────────────────────

/// The recurrence class of a schedule.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Frequency {
  Daily,
  Weekly,
  Monthly,
}

impl Frequency {
  /// Parse a stored frequency. Anything unrecognised is an error; it is never
  /// treated as `daily`.
  pub fn parse(value: &str) -> Result<Self> {
    value
      .parse()
      .map_err(|_| Error::UnknownFrequency(value.to_owned()))
  }
}

// ─── Recurrence ──────────────────────────────────────────────────────────────

/// Which calendar days a schedule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
  /// Every day; no day filtering.
  Daily,
  /// The listed days of the week.
  Weekly(BTreeSet<Weekday>),
  /// The listed days of the month, each in `1..=31`.
  Monthly(BTreeSet<u8>),
}

impl Recurrence {
  pub fn frequency(&self) -> Frequency {
    match self {
      Self::Daily => Frequency::Daily,
      Self::Weekly(_) => Frequency::Weekly,
      Self::Monthly(_) => Frequency::Monthly,
    }
  }

  /// `false` for a weekly or monthly recurrence with no days selected.
  pub fn has_days(&self) -> bool {
    match self {
      Self::Daily => true,
      Self::Weekly(days) => !days.is_empty(),
      Self::Monthly(days) => !days.is_empty(),
    }
  }
}

// ─── MedicationSchedule ──────────────────────────────────────────────────────

/// A medication's recurring dose configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule", into = "RawSchedule")]
pub struct MedicationSchedule {
  pub recurrence: Recurrence,
  /// Unique and ascending.
  pub times:      BTreeSet<TimeOfDay>,
  /// Free-text amount with unit, e.g. `"10mg"`.
  pub dosage:     String,
}

impl MedicationSchedule {
  pub fn daily(times: impl IntoIterator<Item = TimeOfDay>, dosage: impl Into<String>) -> Self {
    Self {
      recurrence: Recurrence::Daily,
      times:      times.into_iter().collect(),
      dosage:     dosage.into(),
    }
  }

  pub fn weekly(
    days: impl IntoIterator<Item = Weekday>,
    times: impl IntoIterator<Item = TimeOfDay>,
    dosage: impl Into<String>,
  ) -> Self {
    Self {
      recurrence: Recurrence::Weekly(days.into_iter().collect()),
      times:      times.into_iter().collect(),
      dosage:     dosage.into(),
    }
  }

  pub fn monthly(
    days: impl IntoIterator<Item = u8>,
    times: impl IntoIterator<Item = TimeOfDay>,
    dosage: impl Into<String>,
  ) -> Self {
    Self {
      recurrence: Recurrence::Monthly(days.into_iter().collect()),
      times:      times.into_iter().collect(),
      dosage:     dosage.into(),
    }
  }

  pub fn frequency(&self) -> Frequency { self.recurrence.frequency() }

  /// A schedule is complete, and therefore resolvable and persistable, once
  /// it has at least one time and, unless daily, at least one day.
  pub fn is_complete(&self) -> bool {
    !self.times.is_empty() && self.recurrence.has_days()
  }
}

// ─── Wire form ───────────────────────────────────────────────────────────────

/// The flat schedule shape exchanged with clients and stored in documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchedule {
  pub frequency: String,
  #[serde(default)]
  pub days:      Vec<String>,
  #[serde(default)]
  pub times:     Vec<String>,
  #[serde(default)]
  pub dosage:    String,
}

impl TryFrom<RawSchedule> for MedicationSchedule {
  type Error = Error;

  fn try_from(raw: RawSchedule) -> Result<Self> {
    let recurrence = match Frequency::parse(&raw.frequency)? {
      Frequency::Daily => Recurrence::Daily,
      Frequency::Weekly => Recurrence::Weekly(
        raw
          .days
          .iter()
          .map(|d| Weekday::parse(d))
          .collect::<Result<_>>()?,
      ),
      Frequency::Monthly => Recurrence::Monthly(
        raw
          .days
          .iter()
          .map(|d| parse_month_day(d))
          .collect::<Result<_>>()?,
      ),
    };

    let times = raw
      .times
      .iter()
      .map(|t| t.parse::<TimeOfDay>())
      .collect::<Result<_>>()?;

    Ok(Self { recurrence, times, dosage: raw.dosage })
  }
}

impl From<MedicationSchedule> for RawSchedule {
  fn from(schedule: MedicationSchedule) -> Self {
    let frequency = schedule.frequency().to_string();
    let days = match &schedule.recurrence {
      Recurrence::Daily => Weekday::ALL.iter().map(|d| d.to_string()).collect(),
      Recurrence::Weekly(days) => days.iter().map(ToString::to_string).collect(),
      Recurrence::Monthly(days) => days.iter().map(ToString::to_string).collect(),
    };
    Self {
      frequency,
      days,
      times: schedule.times.iter().map(ToString::to_string).collect(),
      dosage: schedule.dosage,
    }
  }
}

/// Parse a day-of-month string in `1..=31`: one or two ASCII digits, with
/// no sign or surrounding whitespace.
pub fn parse_month_day(value: &str) -> Result<u8> {
  Some(value)
    .filter(|v| matches!(v.len(), 1 | 2) && v.bytes().all(|b| b.is_ascii_digit()))
    .and_then(|v| v.parse::<u8>().ok())
    .filter(|d| (1..=31).contains(d))
    .ok_or_else(|| Error::InvalidMonthDay(value.to_owned()))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn t(s: &str) -> TimeOfDay { s.parse().unwrap() }

  #[test]
  fn weekly_schedule_parses_from_wire_form() {
    let schedule: MedicationSchedule = serde_json::from_value(json!({
      "frequency": "weekly",
      "days": ["Monday", "wednesday"],
      "times": ["21:00", "09:00", "09:00"],
      "dosage": "10mg",
    }))
    .unwrap();

    assert_eq!(
      schedule.recurrence,
      Recurrence::Weekly([Weekday::Monday, Weekday::Wednesday].into())
    );
    let times: Vec<_> = schedule.times.iter().copied().collect();
    assert_eq!(times, [t("09:00"), t("21:00")]);
    assert!(schedule.is_complete());
  }

  #[test]
  fn monthly_schedule_canonicalises_days() {
    let raw = RawSchedule {
      frequency: "monthly".into(),
      days:      vec!["15".into(), "01".into()],
      times:     vec!["08:00".into()],
      dosage:    "1 tablet".into(),
    };
    let schedule = MedicationSchedule::try_from(raw).unwrap();
    assert_eq!(schedule.recurrence, Recurrence::Monthly([1, 15].into()));

    let back = RawSchedule::from(schedule);
    assert_eq!(back.days, ["1", "15"]);
  }

  #[test]
  fn daily_schedule_ignores_days_and_emits_all_weekdays() {
    let schedule: MedicationSchedule = serde_json::from_value(json!({
      "frequency": "daily",
      "days": ["not-a-day"],
      "times": ["08:00"],
      "dosage": "5mg",
    }))
    .unwrap();
    assert_eq!(schedule.recurrence, Recurrence::Daily);

    let value = serde_json::to_value(&schedule).unwrap();
    assert_eq!(value["days"].as_array().unwrap().len(), 7);
    assert_eq!(value["days"][0], "sunday");
    assert_eq!(value["frequency"], "daily");
  }

  #[test]
  fn unknown_frequency_is_reported_not_defaulted() {
    let raw = RawSchedule {
      frequency: "fortnightly".into(),
      days:      vec![],
      times:     vec!["08:00".into()],
      dosage:    String::new(),
    };
    assert!(matches!(
      MedicationSchedule::try_from(raw),
      Err(Error::UnknownFrequency(f)) if f == "fortnightly"
    ));
  }

  #[test]
  fn month_days_are_plain_digits() {
    assert_eq!(parse_month_day("5").unwrap(), 5);
    assert_eq!(parse_month_day("05").unwrap(), 5);
    assert_eq!(parse_month_day("31").unwrap(), 31);
    for bad in ["", "0", "32", "+5", " 5 ", "5 ", "-1", "05x", "005", "٥"] {
      assert!(
        matches!(parse_month_day(bad), Err(Error::InvalidMonthDay(_))),
        "input {bad:?}"
      );
    }
  }

  #[test]
  fn invalid_days_and_times_are_rejected() {
    let bad_day = RawSchedule {
      frequency: "monthly".into(),
      days:      vec!["32".into()],
      times:     vec!["08:00".into()],
      dosage:    String::new(),
    };
    assert!(matches!(MedicationSchedule::try_from(bad_day), Err(Error::InvalidMonthDay(_))));

    let bad_weekday = RawSchedule {
      frequency: "weekly".into(),
      days:      vec!["1".into()],
      times:     vec!["08:00".into()],
      dosage:    String::new(),
    };
    assert!(matches!(MedicationSchedule::try_from(bad_weekday), Err(Error::InvalidWeekday(_))));

    let bad_time = RawSchedule {
      frequency: "daily".into(),
      days:      vec![],
      times:     vec!["8am".into()],
      dosage:    String::new(),
    };
    assert!(matches!(MedicationSchedule::try_from(bad_time), Err(Error::InvalidTime(_))));
  }

  #[test]
  fn completeness_requires_times_and_days() {
    assert!(!MedicationSchedule::daily([], "5mg").is_complete());
    assert!(MedicationSchedule::daily([t("08:00")], "5mg").is_complete());
    assert!(!MedicationSchedule::weekly([], [t("08:00")], "5mg").is_complete());
    assert!(!MedicationSchedule::monthly([], [t("08:00")], "5mg").is_complete());
    assert!(MedicationSchedule::monthly([3], [t("08:00")], "5mg").is_complete());
  }
}
