//! Time and day utilities.
//!
//! Times of day are persisted and compared only in the canonical 24-hour
//! `"HH:MM"` form. Everything in this module is pure.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// A day of the week, stored as its lowercase full name.
///
/// Declaration order is Sunday-first so that the derived `Ord` matches the
/// resolver's Sunday = 0 numbering.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Weekday {
  Sunday,
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
}

impl Weekday {
  pub const ALL: [Weekday; 7] = [
    Self::Sunday,
    Self::Monday,
    Self::Tuesday,
    Self::Wednesday,
    Self::Thursday,
    Self::Friday,
    Self::Saturday,
  ];

  /// Parse a weekday name, ignoring ASCII case.
  pub fn parse(name: &str) -> Result<Self> {
    name
      .trim()
      .parse()
      .map_err(|_| Error::InvalidWeekday(name.to_owned()))
  }

  /// The lowercase full name, e.g. `"monday"`.
  pub fn name(self) -> &'static str { self.into() }

  /// 0 (Sunday) through 6 (Saturday).
  pub fn number_from_sunday(self) -> u32 {
    match self {
      Self::Sunday => 0,
      Self::Monday => 1,
      Self::Tuesday => 2,
      Self::Wednesday => 3,
      Self::Thursday => 4,
      Self::Friday => 5,
      Self::Saturday => 6,
    }
  }

  /// 1 (Sunday) through 7 (Saturday), the numbering carried by weekly
  /// notification triggers.
  pub fn trigger_number(self) -> u8 {
    match self {
      Self::Sunday => 1,
      Self::Monday => 2,
      Self::Tuesday => 3,
      Self::Wednesday => 4,
      Self::Thursday => 5,
      Self::Friday => 6,
      Self::Saturday => 7,
    }
  }

  /// Inverse of [`Weekday::trigger_number`].
  pub fn from_trigger_number(n: u8) -> Option<Self> {
    Self::ALL.into_iter().find(|d| d.trigger_number() == n)
  }

  /// The weekday of a calendar date. No timezone is involved.
  pub fn of(date: NaiveDate) -> Self { date.weekday().into() }
}

impl From<chrono::Weekday> for Weekday {
  fn from(w: chrono::Weekday) -> Self {
    match w {
      chrono::Weekday::Sun => Self::Sunday,
      chrono::Weekday::Mon => Self::Monday,
      chrono::Weekday::Tue => Self::Tuesday,
      chrono::Weekday::Wed => Self::Wednesday,
      chrono::Weekday::Thu => Self::Thursday,
      chrono::Weekday::Fri => Self::Friday,
      chrono::Weekday::Sat => Self::Saturday,
    }
  }
}

impl From<Weekday> for chrono::Weekday {
  fn from(w: Weekday) -> Self {
    match w {
      Weekday::Sunday => Self::Sun,
      Weekday::Monday => Self::Mon,
      Weekday::Tuesday => Self::Tue,
      Weekday::Wednesday => Self::Wed,
      Weekday::Thursday => Self::Thu,
      Weekday::Friday => Self::Fri,
      Weekday::Saturday => Self::Sat,
    }
  }
}

// ─── TimeOfDay ───────────────────────────────────────────────────────────────

/// A wall-clock time with minute precision. Serialised as `"HH:MM"`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
  hour:   u8,
  minute: u8,
}

impl TimeOfDay {
  /// Returns `None` unless `hour < 24` and `minute < 60`.
  pub fn new(hour: u8, minute: u8) -> Option<Self> {
    (hour < 24 && minute < 60).then_some(Self { hour, minute })
  }

  pub fn hour(self) -> u8 { self.hour }

  pub fn minute(self) -> u8 { self.minute }

  /// 12-hour form, e.g. `"9:05 PM"`. Hours 0 and 12 both show as 12.
  pub fn display_12h(self) -> String {
    let suffix = if self.hour < 12 { "AM" } else { "PM" };
    let hour = match self.hour % 12 {
      0 => 12,
      h => h,
    };
    format!("{hour}:{:02} {suffix}", self.minute)
  }
}

impl fmt::Display for TimeOfDay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", self.hour, self.minute)
  }
}

impl FromStr for TimeOfDay {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidTime(s.to_owned());

    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(h) || !two_digits(m) {
      return Err(invalid());
    }

    let hour: u8 = h.parse().map_err(|_| invalid())?;
    let minute: u8 = m.parse().map_err(|_| invalid())?;
    Self::new(hour, minute).ok_or_else(invalid)
  }
}

impl TryFrom<String> for TimeOfDay {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<TimeOfDay> for String {
  fn from(t: TimeOfDay) -> Self { t.to_string() }
}

// ─── Formatting helpers ──────────────────────────────────────────────────────

/// Canonical zero-padded 24-hour form of `(hours, minutes)`.
pub fn store_time(hours: u8, minutes: u8) -> String {
  format!("{hours:02}:{minutes:02}")
}

/// Convert a canonical `"HH:MM"` string to `"H:MM AM/PM"`.
///
/// Returns `None` for malformed input rather than panicking.
pub fn display_time(stored: &str) -> Option<String> {
  stored.parse::<TimeOfDay>().ok().map(TimeOfDay::display_12h)
}

/// Keyword table for [`format_dosage`]. Scanned in order; first match wins.
const DOSAGE_UNITS: &[(&[&str], &str)] = &[
  (LIQUID_KEYWORDS, "mL"),
  (INHALER_KEYWORDS, "puffs"),
  (DROP_KEYWORDS, "drops"),
];

const LIQUID_KEYWORDS: &[&str] = &["syrup", "liquid", "solution", "suspension", "elixir"];
const INHALER_KEYWORDS: &[&str] = &["inhaler", "inhalation", "aerosol"];
const DROP_KEYWORDS: &[&str] = &["drops", "drop", "ophthalmic", "otic"];

const DEFAULT_DOSAGE_UNIT: &str = "mg";

/// Append a unit to a bare numeric amount, inferred from keywords in the
/// medication's name.
///
/// ```
/// # use pillbox_core::time::format_dosage;
/// assert_eq!(format_dosage("81", "Aspirin"), "81mg");
/// assert_eq!(format_dosage("5", "Albuterol Inhaler"), "5puffs");
/// ```
pub fn format_dosage(amount: &str, medication_name: &str) -> String {
  let name = medication_name.to_ascii_lowercase();
  let unit = DOSAGE_UNITS
    .iter()
    .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
    .map_or(DEFAULT_DOSAGE_UNIT, |&(_, unit)| unit);
  format!("{}{unit}", amount.trim())
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// `YYYY-MM-DD`, the partition key of the taken-dose log.
pub fn date_key(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(key, "%Y-%m-%d")
    .map_err(|_| Error::InvalidDateKey(key.to_owned()))
}

/// Number of days in `month` (1-12) of `year`, or `None` for a month (or
/// year) chrono cannot represent.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next = if month == 12 {
    NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
  } else {
    NaiveDate::from_ymd_opt(year, month + 1, 1)?
  };
  u32::try_from(next.signed_duration_since(first).num_days()).ok()
}
