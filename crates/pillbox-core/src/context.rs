//! Context handed to the text-completion service for chat and reports.
//!
//! The completion service itself is external: prompt text in, text out. This
//! module only shapes what goes across that boundary.

use std::{fmt::Write as _, future::Future};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  group::ScheduleGroups,
  medication::Medication,
  taken::TakenLog,
  time::date_key,
};

// ─── Schedule context ────────────────────────────────────────────────────────

/// A due-today line in the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueEntry {
  pub medication_id: Uuid,
  pub name:          String,
  pub dosage:        String,
  /// 12-hour display times, ascending.
  pub times:         Vec<String>,
  pub taken:         bool,
}

/// An upcoming line in the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEntry {
  pub medication_id: Uuid,
  pub name:          String,
  pub dosage:        String,
  pub days_until:    u32,
}

/// A user's schedule as of one date, ready for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationContext {
  pub date:      NaiveDate,
  pub due_today: Vec<DueEntry>,
  /// Ascending by `days_until`.
  pub upcoming:  Vec<UpcomingEntry>,
}

impl MedicationContext {
  pub fn build(groups: &ScheduleGroups, taken: &TakenLog, date: NaiveDate) -> Self {
    let due_today = groups
      .due_today
      .iter()
      .map(|m| DueEntry {
        medication_id: m.medication_id,
        name:          m.display_name().to_owned(),
        dosage:        dosage_of(m),
        times:         m
          .schedule
          .iter()
          .flat_map(|s| s.times.iter().map(|t| t.display_12h()))
          .collect(),
        taken:         taken.is_taken(date, m.medication_id),
      })
      .collect();

    let mut upcoming: Vec<UpcomingEntry> = groups
      .upcoming
      .iter()
      .map(|u| UpcomingEntry {
        medication_id: u.medication.medication_id,
        name:          u.medication.display_name().to_owned(),
        dosage:        dosage_of(&u.medication),
        days_until:    u.days_until,
      })
      .collect();
    upcoming.sort_by_key(|u| u.days_until);

    Self { date, due_today, upcoming }
  }

  /// Plain-text rendering for inclusion in a prompt.
  pub fn render(&self) -> String {
    let mut out = format!("Medication schedule for {}\n", date_key(self.date));

    out.push_str("Due today:\n");
    if self.due_today.is_empty() {
      out.push_str("- none\n");
    }
    for entry in &self.due_today {
      let status = if entry.taken { "taken" } else { "not yet taken" };
      let _ = writeln!(
        out,
        "- {} {} at {} ({status})",
        entry.name,
        entry.dosage,
        entry.times.join(", ")
      );
    }

    out.push_str("Upcoming:\n");
    if self.upcoming.is_empty() {
      out.push_str("- none\n");
    }
    for entry in &self.upcoming {
      let unit = if entry.days_until == 1 { "day" } else { "days" };
      let _ = writeln!(out, "- {} {} in {} {unit}", entry.name, entry.dosage, entry.days_until);
    }

    out
  }
}

fn dosage_of(medication: &Medication) -> String {
  medication
    .schedule
    .as_ref()
    .map(|s| s.dosage.clone())
    .unwrap_or_default()
}

// ─── Text completion boundary ────────────────────────────────────────────────

/// An external prompt-in / text-out service.
pub trait TextCompletion: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn complete(
    &self,
    prompt: String,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}

/// The generated interaction summary for a set of medications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSummary {
  pub medication_names: Vec<String>,
  pub summary:          String,
}

/// Prompt asking for an interaction overview of `names`.
pub fn interaction_prompt(names: &[String]) -> String {
  let mut prompt = String::from(
    "Summarise known interactions between the following medications in plain language:\n",
  );
  for name in names {
    let _ = writeln!(prompt, "- {name}");
  }
  prompt
}

/// Ask `service` for an interaction summary of `medications`.
///
/// Names are deduplicated case-insensitively and sorted. With fewer than two
/// distinct medications there is nothing to compare and the service is not
/// called.
pub async fn summarize_interactions<C>(
  service: &C,
  medications: &[Medication],
) -> Result<InteractionSummary, C::Error>
where
  C: TextCompletion,
{
  let mut names: Vec<String> = medications
    .iter()
    .map(|m| m.display_name().trim().to_owned())
    .filter(|n| !n.is_empty())
    .collect();
  names.sort_by_key(|n| n.to_lowercase());
  names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

  if names.len() < 2 {
    return Ok(InteractionSummary { medication_names: names, summary: String::new() });
  }

  let summary = service.complete(interaction_prompt(&names)).await?;
  Ok(InteractionSummary {
    medication_names: names,
    summary:          summary.trim().to_owned(),
  })
}
