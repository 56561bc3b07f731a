//! Handlers for the customer list and the subscription ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/customers` | Optional `?limit=&offset=`; any role |
//! | `GET`  | `/customers/:client_id` | 404 if the client does not exist |
//! | `POST` | `/customers` | Body: [`CreateCustomerBody`]; manager+ |
//! | `POST` | `/subscriptions/:id/status` | Body: `{"status":"paused"}`; manager+ |
//! | `POST` | `/clients/:client_id/status` | Body: `{"status":"inactive"}`; manager+ |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use quantdesk_core::{
  audit::{NewAuditEvent, action},
  client::{Client, ClientStatus, NewClient},
  policy::Action,
  store::{FundStore, Page},
  subscription::{
    NewSubscription, Subscription, SubscriptionDetail, SubscriptionStatus,
  },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Caller, authz, error::{ApiError, store_error}};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /customers[?limit=&offset=]` — newest-created-first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubscriptionDetail>>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ViewDashboard).await?;

  let rows = state
    .store
    .list_subscriptions(Page {
      limit:  params.limit,
      offset: params.offset,
    })
    .await
    .map_err(store_error)?;
  Ok(Json(rows))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// A client joined with its full subscription history, newest first.
#[derive(Debug, Serialize)]
pub struct CustomerView {
  pub client:        Client,
  pub subscriptions: Vec<SubscriptionDetail>,
}

/// `GET /customers/:client_id` — a not-found client is a 404, not an error
/// state.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(client_id): Path<Uuid>,
) -> Result<Json<CustomerView>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ViewDashboard).await?;

  let client = state
    .store
    .get_client(client_id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("client {client_id} not found")))?;

  let subscriptions = state
    .store
    .client_subscriptions(client_id)
    .await
    .map_err(store_error)?;

  Ok(Json(CustomerView { client, subscriptions }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /customers` — the client attributes plus its
/// first subscription.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerBody {
  pub name:        String,
  pub email:       Option<String>,
  pub strategy_id: Uuid,
  pub current_aum: f64,
  pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CustomerCreated {
  pub client:       Client,
  pub subscription: Subscription,
}

/// `POST /customers` — manager and above. Client and subscription are
/// written in one transaction; on failure neither row exists.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateCustomerBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageCustomers)
      .await?;

  let now = Utc::now();

  // Reject obviously-bad input before touching the store; the store
  // re-validates inside the transaction.
  if body.current_aum < 0.0 {
    return Err(ApiError::BadRequest(format!(
      "AUM must be non-negative, got {}",
      body.current_aum
    )));
  }
  if let Some(expiry) = body.expiry_date
    && expiry < now
  {
    return Err(ApiError::BadRequest(format!(
      "expiry date {expiry} is in the past"
    )));
  }

  let (client, subscription) = state
    .store
    .create_customer(
      NewClient {
        name:  body.name,
        email: body.email,
      },
      NewSubscription {
        strategy_id: body.strategy_id,
        current_aum: body.current_aum,
        expiry_date: body.expiry_date,
      },
      now,
    )
    .await
    .map_err(store_error)?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::CUSTOMER_CREATE.to_string(),
        detail: format!(
          "created client {} ({}) with AUM {}",
          client.name, client.client_id, subscription.current_aum
        ),
      },
      now,
    )
    .await
    .map_err(store_error)?;

  Ok((StatusCode::CREATED, Json(CustomerCreated { client, subscription })))
}

// ─── Subscription status ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: SubscriptionStatus,
}

/// `POST /subscriptions/:id/status` — manager and above. Transitions are
/// unconstrained: staff may reactivate or pause regardless of dates.
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(subscription_id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Subscription>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageCustomers)
      .await?;

  let subscription = state
    .store
    .update_subscription_status(subscription_id, body.status)
    .await
    .map_err(store_error)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("subscription {subscription_id} not found"))
    })?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::SUBSCRIPTION_STATUS.to_string(),
        detail: format!(
          "subscription {subscription_id} set to {:?}",
          subscription.status
        ),
      },
      Utc::now(),
    )
    .await
    .map_err(store_error)?;

  Ok(Json(subscription))
}

// ─── Client status ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClientStatusBody {
  pub status: ClientStatus,
}

/// `POST /clients/:client_id/status` — manager and above.
pub async fn set_client_status<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(client_id): Path<Uuid>,
  Json(body): Json<ClientStatusBody>,
) -> Result<Json<Client>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageCustomers)
      .await?;

  let client = state
    .store
    .set_client_status(client_id, body.status)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("client {client_id} not found")))?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::CLIENT_STATUS.to_string(),
        detail: format!("client {client_id} set to {:?}", client.status),
      },
      Utc::now(),
    )
    .await
    .map_err(store_error)?;

  Ok(Json(client))
}
