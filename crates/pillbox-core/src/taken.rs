//! The taken-dose log: which medications were marked taken on which date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `date -> set of medication ids`. A medication appears at most once per
/// date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TakenLog {
  by_date: BTreeMap<NaiveDate, BTreeSet<Uuid>>,
}

impl TakenLog {
  pub fn new() -> Self { Self::default() }

  /// Record `medication_id` as taken on `date`. Returns `false` if it was
  /// already recorded.
  pub fn mark(&mut self, date: NaiveDate, medication_id: Uuid) -> bool {
    self.by_date.entry(date).or_default().insert(medication_id)
  }

  /// Remove a mark. Returns `false` if there was nothing to remove.
  pub fn unmark(&mut self, date: NaiveDate, medication_id: Uuid) -> bool {
    let Some(ids) = self.by_date.get_mut(&date) else {
      return false;
    };
    let removed = ids.remove(&medication_id);
    if ids.is_empty() {
      self.by_date.remove(&date);
    }
    removed
  }

  pub fn is_taken(&self, date: NaiveDate, medication_id: Uuid) -> bool {
    self
      .by_date
      .get(&date)
      .is_some_and(|ids| ids.contains(&medication_id))
  }

  /// Ids marked taken on `date`, in ascending order.
  pub fn taken_on(&self, date: NaiveDate) -> impl Iterator<Item = Uuid> + '_ {
    self.by_date.get(&date).into_iter().flatten().copied()
  }

  pub fn is_empty(&self) -> bool { self.by_date.is_empty() }
}

impl FromIterator<(NaiveDate, Uuid)> for TakenLog {
  fn from_iter<I: IntoIterator<Item = (NaiveDate, Uuid)>>(iter: I) -> Self {
    let mut log = Self::new();
    for (date, id) in iter {
      log.mark(date, id);
    }
    log
  }
}
