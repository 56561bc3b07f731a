//! Handler for `GET /cron/expire-subscriptions`.
//!
//! Invoked on a fixed daily schedule by an external trigger, authenticated
//! with `Authorization: Bearer <cron_secret>`. Responses:
//!
//! - 500 `{"error":…}` if the secret is not configured server-side
//! - 401 if the header is absent or mismatched, before any mutation
//! - 500 `{"error":…}` if the batch update fails
//! - 200 `{"ok":true,"result":<n>}` on success

use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use quantdesk_core::{
  audit::{NewAuditEvent, action},
  store::FundStore,
};

use crate::{AppState, auth::verify_cron_secret, error::{ApiError, store_error}};

/// Run the expiry sweep: every non-expired subscription past its expiry date
/// transitions to `expired`. Idempotent — a re-run reports 0 transitions.
pub async fn expire<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  verify_cron_secret(&headers, state.config.cron_secret.as_deref())?;

  let now = Utc::now();
  let expired = state.store.expire_due(now).await.map_err(store_error)?;

  tracing::info!(expired, "expiry sweep completed");

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  None,
        action: action::SWEEP_RUN.to_string(),
        detail: format!("expired {expired} subscription(s)"),
      },
      now,
    )
    .await
    .map_err(store_error)?;

  Ok(Json(serde_json::json!({ "ok": true, "result": expired })))
}
