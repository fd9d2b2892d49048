//! SQL schema for the Pillbox SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS medications (
    medication_id TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL,
    brand_name    TEXT NOT NULL,
    generic_name  TEXT,
    dosage_form   TEXT,
    schedule_json TEXT,            -- wire-form schedule or NULL
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at    TEXT NOT NULL
);

-- One row per (user, date, medication): the date key partitions the log and
-- the medication id deduplicates within a date.
CREATE TABLE IF NOT EXISTS taken_doses (
    user_id       TEXT NOT NULL,
    date_key      TEXT NOT NULL,   -- YYYY-MM-DD
    medication_id TEXT NOT NULL REFERENCES medications(medication_id) ON DELETE CASCADE,
    recorded_at   TEXT NOT NULL,
    PRIMARY KEY (user_id, date_key, medication_id)
);

CREATE INDEX IF NOT EXISTS medications_user_idx ON medications(user_id);
CREATE INDEX IF NOT EXISTS taken_medication_idx ON taken_doses(medication_id);

PRAGMA user_version = 1;
";
