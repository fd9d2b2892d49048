//! An in-process [`NotificationDispatcher`].
//!
//! Delivery belongs to the client devices, which fetch their plans from
//! `/medications/{id}/triggers`. The server keeps the current registrations
//! per group key so that re-planning can be observed and logged.

use std::{collections::HashMap, convert::Infallible};

use pillbox_core::{dispatch::NotificationDispatcher, plan::TriggerDescriptor};
use tokio::sync::RwLock;

/// Registered triggers keyed by group key.
#[derive(Default)]
pub struct InProcessDispatcher {
  groups: RwLock<HashMap<String, Vec<TriggerDescriptor>>>,
}

impl InProcessDispatcher {
  pub fn new() -> Self { Self::default() }

  /// A snapshot of the triggers registered under `group_key`.
  pub async fn registered(&self, group_key: &str) -> Vec<TriggerDescriptor> {
    self
      .groups
      .read()
      .await
      .get(group_key)
      .cloned()
      .unwrap_or_default()
  }

  /// Total triggers across all groups.
  pub async fn total(&self) -> usize {
    self.groups.read().await.values().map(Vec::len).sum()
  }
}

impl NotificationDispatcher for InProcessDispatcher {
  type Error = Infallible;

  async fn cancel_group(&self, group_key: &str) -> Result<usize, Infallible> {
    let cancelled = self
      .groups
      .write()
      .await
      .remove(group_key)
      .map_or(0, |triggers| triggers.len());
    if cancelled > 0 {
      tracing::debug!(group_key, cancelled, "cancelled trigger group");
    }
    Ok(cancelled)
  }

  async fn replace_group(
    &self,
    group_key: &str,
    triggers: Vec<TriggerDescriptor>,
  ) -> Result<usize, Infallible> {
    let mut groups = self.groups.write().await;
    let cancelled = groups.remove(group_key).map_or(0, |old| old.len());
    for trigger in &triggers {
      tracing::debug!(
        group_key,
        repeat = ?trigger.repeat,
        hour = trigger.hour,
        minute = trigger.minute,
        title = %trigger.title(),
        "registered trigger"
      );
    }
    let registered = triggers.len();
    if registered > 0 {
      groups.insert(group_key.to_owned(), triggers);
    }
    tracing::debug!(group_key, cancelled, registered, "replaced trigger group");
    Ok(registered)
  }
}
