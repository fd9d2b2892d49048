//! Plain-text rendering of API responses for the terminal.

use std::fmt::Write as _;

use pillbox_core::{
  context::MedicationContext,
  medication::Medication,
  plan::{TriggerDescriptor, TriggerRepeat},
  schedule::{MedicationSchedule, Recurrence},
  time::{TimeOfDay, Weekday, date_key},
};

/// One line per medication: id, name and a schedule summary.
pub fn medication_list(medications: &[Medication]) -> String {
  if medications.is_empty() {
    return "No medications.\n".to_string();
  }

  let mut out = String::new();
  for m in medications {
    let summary = m
      .schedule
      .as_ref()
      .map_or_else(|| "no schedule".to_string(), describe_schedule);
    let _ = writeln!(out, "{}  {}  {summary}", m.medication_id, m.display_name());
  }
  out
}

/// e.g. `weekly on monday, thursday at 8:00 AM, 8:00 PM (10mg)`.
pub fn describe_schedule(schedule: &MedicationSchedule) -> String {
  let when = match &schedule.recurrence {
    Recurrence::Daily => "daily".to_string(),
    Recurrence::Weekly(days) => format!(
      "weekly on {}",
      days.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
    ),
    Recurrence::Monthly(days) => format!(
      "monthly on day {}",
      days.iter().map(u8::to_string).collect::<Vec<_>>().join(", ")
    ),
  };

  let mut out = when;
  if !schedule.times.is_empty() {
    let _ = write!(out, " at {}", twelve_hour(schedule.times.iter().copied()));
  }
  if !schedule.dosage.is_empty() {
    let _ = write!(out, " ({})", schedule.dosage);
  }
  if !schedule.is_complete() {
    out.push_str(" [incomplete]");
  }
  out
}

/// The `today` view: due medications with a checkbox, then upcoming ones.
pub fn today(ctx: &MedicationContext) -> String {
  let mut out = format!("{}\n", date_key(ctx.date));

  out.push_str("\nDue today\n");
  if ctx.due_today.is_empty() {
    out.push_str("  nothing due\n");
  }
  for entry in &ctx.due_today {
    let mark = if entry.taken { "x" } else { " " };
    let _ = writeln!(
      out,
      "  [{mark}] {} {}  {}  ({})",
      entry.name,
      entry.dosage,
      entry.times.join(", "),
      entry.medication_id
    );
  }

  out.push_str("\nUpcoming\n");
  if ctx.upcoming.is_empty() {
    out.push_str("  nothing upcoming\n");
  }
  for entry in &ctx.upcoming {
    let when = match entry.days_until {
      1 => "tomorrow".to_string(),
      n => format!("in {n} days"),
    };
    let _ = writeln!(out, "  {} {}  {when}", entry.name, entry.dosage);
  }
  out
}

/// One line per planned trigger.
pub fn triggers(triggers: &[TriggerDescriptor]) -> String {
  if triggers.is_empty() {
    return "No triggers planned.\n".to_string();
  }

  let mut out = String::new();
  for trigger in triggers {
    let when = match trigger.repeat {
      TriggerRepeat::Daily => "every day".to_string(),
      TriggerRepeat::Weekly { weekday } => match Weekday::from_trigger_number(weekday) {
        Some(day) => format!("every {day}"),
        None => format!("weekday {weekday}"),
      },
      TriggerRepeat::Monthly { day_of_month } => format!("monthly on day {day_of_month}"),
    };
    let time = TimeOfDay::new(trigger.hour, trigger.minute)
      .map_or_else(|| format!("{}:{:02}", trigger.hour, trigger.minute), TimeOfDay::display_12h);
    let _ = writeln!(out, "{when} at {time}: {} {}", trigger.title(), trigger.body());
  }
  out
}

fn twelve_hour(times: impl Iterator<Item = TimeOfDay>) -> String {
  times.map(TimeOfDay::display_12h).collect::<Vec<_>>().join(", ")
}
