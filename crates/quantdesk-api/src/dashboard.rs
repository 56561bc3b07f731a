//! Handler for `GET /dashboard`.
//!
//! Recomputes every figure from the ledger on each request. The four scalar
//! aggregates and the recent list are independent pure reads; estimated MRR
//! is derived from the freshly-computed total AUM, never stored.

use axum::{Json, extract::State};
use chrono::Utc;
use quantdesk_core::{
  metrics::{DashboardSummary, RecentClient, estimated_mrr},
  policy::Action,
  store::FundStore,
};

use crate::{AppState, auth::Caller, authz, error::{ApiError, store_error}};

/// How many recent subscriptions the dashboard's client list shows.
const RECENT_LIMIT: usize = 5;

/// `GET /dashboard` — any authenticated role.
pub async fn summary<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ViewDashboard).await?;

  let now = Utc::now();
  let store = state.store.as_ref();

  let total_aum = store.total_aum().await.map_err(store_error)?;
  let active_clients = store.active_client_count().await.map_err(store_error)?;
  let expiring_soon =
    store.expiring_soon_count(now).await.map_err(store_error)?;
  let recent = store
    .recent_subscriptions(RECENT_LIMIT)
    .await
    .map_err(store_error)?;

  Ok(Json(DashboardSummary {
    total_aum,
    active_clients,
    expiring_soon,
    est_mrr: estimated_mrr(total_aum),
    recent: recent.iter().map(RecentClient::from).collect(),
  }))
}
