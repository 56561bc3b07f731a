//! Handlers for the strategy catalog.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/strategies` | Manager and above |
//! | `POST` | `/strategies` | Super admin; catalog seeding |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use quantdesk_core::{policy::Action, store::FundStore, strategy::Strategy};
use serde::Deserialize;

use crate::{AppState, auth::Caller, authz, error::{ApiError, store_error}};

/// `GET /strategies`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Strategy>>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ManageCustomers).await?;

  let strategies = state.store.list_strategies().await.map_err(store_error)?;
  Ok(Json(strategies))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /strategies` — body: `{"name":"Alpha Long/Short"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let strategy = state
    .store
    .add_strategy(body.name, Utc::now())
    .await
    .map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(strategy)))
}
