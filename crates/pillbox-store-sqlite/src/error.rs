//! Error type for `pillbox-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Includes schedules whose stored frequency is not recognised.
  #[error("core error: {0}")]
  Core(#[from] pillbox_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The medication does not exist, or belongs to another user.
  #[error("medication not found: {0}")]
  MedicationNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
