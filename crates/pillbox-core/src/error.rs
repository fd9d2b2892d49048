//! Error types for `pillbox-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A schedule named a frequency other than `daily`, `weekly` or `monthly`.
  #[error("unknown schedule frequency: {0:?}")]
  UnknownFrequency(String),

  #[error("invalid weekday name: {0:?}")]
  InvalidWeekday(String),

  #[error("invalid day of month: {0:?}")]
  InvalidMonthDay(String),

  #[error("invalid time of day (expected HH:MM): {0:?}")]
  InvalidTime(String),

  #[error("invalid date key (expected YYYY-MM-DD): {0:?}")]
  InvalidDateKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
