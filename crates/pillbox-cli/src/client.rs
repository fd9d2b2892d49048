//! Async HTTP client wrapping the Pillbox JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use pillbox_core::{
  context::MedicationContext,
  medication::Medication,
  plan::TriggerDescriptor,
  time::date_key,
};
use reqwest::{Client, Response};
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the Pillbox API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub user_id:  String,
}

/// Response body of the taken-log mark/unmark endpoints.
#[derive(Debug, Deserialize)]
pub struct TakenChange {
  pub date:          NaiveDate,
  pub medication_id: Uuid,
  pub taken:         bool,
  pub changed:       bool,
}

/// Async HTTP client for the Pillbox JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  /// Absolute URL of a user-scoped API path.
  fn url(&self, path: &str) -> String {
    format!(
      "{}/api/users/{}{}",
      self.config.base_url.trim_end_matches('/'),
      self.config.user_id,
      path
    )
  }

  // ── Medications ───────────────────────────────────────────────────────────

  /// `GET /api/users/:user/medications`
  pub async fn list_medications(&self) -> Result<Vec<Medication>> {
    let resp = self
      .client
      .get(self.url("/medications"))
      .send()
      .await
      .context("GET /medications failed")?;

    let resp = check("GET /medications", resp).await?;
    resp.json().await.context("deserialising medications")
  }

  /// `GET /api/users/:user/medications/:id/triggers`
  pub async fn triggers(&self, medication_id: Uuid) -> Result<Vec<TriggerDescriptor>> {
    let path = format!("/medications/{medication_id}/triggers");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    let resp = check(&format!("GET {path}"), resp).await?;
    resp.json().await.context("deserialising triggers")
  }

  // ── Schedule ──────────────────────────────────────────────────────────────

  /// `GET /api/users/:user/context?date=<date>`
  pub async fn context(&self, date: NaiveDate) -> Result<MedicationContext> {
    let resp = self
      .client
      .get(self.url("/context"))
      .query(&[("date", date_key(date))])
      .send()
      .await
      .context("GET /context failed")?;

    let resp = check("GET /context", resp).await?;
    resp.json().await.context("deserialising schedule context")
  }

  // ── Taken log ─────────────────────────────────────────────────────────────

  /// `PUT /api/users/:user/taken/:date/:id`
  pub async fn mark_taken(&self, date: NaiveDate, medication_id: Uuid) -> Result<TakenChange> {
    let path = format!("/taken/{}/{medication_id}", date_key(date));
    let resp = self
      .client
      .put(self.url(&path))
      .send()
      .await
      .with_context(|| format!("PUT {path} failed"))?;

    let resp = check(&format!("PUT {path}"), resp).await?;
    resp.json().await.context("deserialising taken mark")
  }

  /// `DELETE /api/users/:user/taken/:date/:id`
  pub async fn unmark_taken(&self, date: NaiveDate, medication_id: Uuid) -> Result<TakenChange> {
    let path = format!("/taken/{}/{medication_id}", date_key(date));
    let resp = self
      .client
      .delete(self.url(&path))
      .send()
      .await
      .with_context(|| format!("DELETE {path} failed"))?;

    let resp = check(&format!("DELETE {path}"), resp).await?;
    resp.json().await.context("deserialising taken mark")
  }
}

/// Turn a non-success response into an error carrying the server's
/// `{"error": ...}` message when there is one.
async fn check(what: &str, resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }

  let body: serde_json::Value = resp.json().await.unwrap_or_default();
  tracing::debug!(%status, %body, "{what} rejected");
  match body.get("error").and_then(|e| e.as_str()) {
    Some(message) => Err(anyhow!("{what} → {status}: {message}")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
