//! The `NotificationDispatcher` trait.
//!
//! A dispatcher registers trigger descriptors with whatever actually fires
//! notifications. The core never talks to an OS scheduler itself.

use std::future::Future;

use uuid::Uuid;

use crate::{
  medication::Medication,
  plan::{TriggerDescriptor, group_key, plan_for_medication},
};

/// Accepts planned triggers and cancels them by group key.
pub trait NotificationDispatcher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cancel every trigger registered under `group_key`. Returns how many
  /// were cancelled.
  fn cancel_group<'a>(
    &'a self,
    group_key: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Swap the triggers registered under `group_key` for `triggers` as one
  /// step. Another caller never observes the group half cancelled or holding
  /// both the old and the new plan. An empty `triggers` just clears the group.
  /// Returns how many triggers are now registered under the key.
  fn replace_group<'a>(
    &'a self,
    group_key: &'a str,
    triggers: Vec<TriggerDescriptor>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}

/// Replace whatever is registered for `medication` with a fresh plan.
///
/// Re-planning an edited schedule never accumulates duplicate triggers,
/// even when several re-plans for the same medication race. Returns the
/// number of triggers now registered.
pub async fn reschedule<D>(dispatcher: &D, medication: &Medication) -> Result<usize, D::Error>
where
  D: NotificationDispatcher,
{
  let key = group_key(medication.medication_id);
  dispatcher
    .replace_group(&key, plan_for_medication(medication))
    .await
}

/// Cancel everything registered for a medication, e.g. after deletion.
pub async fn unschedule<D>(dispatcher: &D, medication_id: Uuid) -> Result<usize, D::Error>
where
  D: NotificationDispatcher,
{
  dispatcher.cancel_group(&group_key(medication_id)).await
}
