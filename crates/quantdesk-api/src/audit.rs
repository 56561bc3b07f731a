//! Handler for `GET /audit` — the append-only audit trail, super admin only.

use axum::{
  Json,
  extract::{Query, State},
};
use quantdesk_core::{
  audit::AuditEvent,
  policy::Action,
  store::{FundStore, Page},
};
use serde::Deserialize;

use crate::{AppState, auth::Caller, authz, error::{ApiError, store_error}};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /audit[?limit=&offset=]` — newest-first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AuditEvent>>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let events = state
    .store
    .list_audit_events(Page {
      limit:  params.limit,
      offset: params.offset,
    })
    .await
    .map_err(store_error)?;
  Ok(Json(events))
}
