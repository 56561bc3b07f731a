//! Handlers for staff profiles, roles and manager↔client assignments.
//!
//! Everything here requires the `super_admin` role, re-derived from the
//! profile store on each call.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/users` | All staff profiles, newest first |
//! | `POST`   | `/users/invite` | Body: [`InviteBody`]; returns 201 + profile |
//! | `POST`   | `/users/:id/role` | Body: `{"role":"manager"}` |
//! | `GET`    | `/users/:id/assignments` | Assigned client ids |
//! | `POST`   | `/users/:id/assignments` | Body: `{"client_id":…}`; idempotent |
//! | `DELETE` | `/users/:id/assignments/:client_id` | Idempotent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use quantdesk_core::{
  audit::{NewAuditEvent, action},
  policy::Action,
  profile::{NewProfile, Profile, Role},
  store::FundStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::Caller, authz, error::{ApiError, store_error}};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let profiles = state.store.list_profiles().await.map_err(store_error)?;
  Ok(Json(profiles))
}

// ─── Invite ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users/invite`. The role is the one the new
/// profile starts with — the *caller's* role is still read from the store.
#[derive(Debug, Deserialize)]
pub struct InviteBody {
  pub full_name: Option<String>,
  pub email:     Option<String>,
  pub role:      Role,
}

/// `POST /users/invite` — creates the staff profile. The external identity
/// provider links its account to the returned `user_id` out of band.
pub async fn invite<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<InviteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let now = Utc::now();
  let profile = state
    .store
    .create_profile(
      NewProfile {
        full_name: body.full_name,
        email:     body.email,
        role:      body.role,
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
        action: action::USER_INVITE.to_string(),
        detail: format!(
          "invited {} as {:?}",
          profile.email.as_deref().unwrap_or("<no email>"),
          profile.role
        ),
      },
      now,
    )
    .await
    .map_err(store_error)?;

  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Role change ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `POST /users/:id/role`
pub async fn set_role<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let profile = state
    .store
    .update_role(user_id, body.role)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::ROLE_CHANGE.to_string(),
        detail: format!("user {user_id} role set to {:?}", profile.role),
      },
      Utc::now(),
    )
    .await
    .map_err(store_error)?;

  Ok(Json(profile))
}

// ─── Assignments ─────────────────────────────────────────────────────────────

/// `GET /users/:id/assignments`
pub async fn assignments<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let clients = state
    .store
    .assigned_clients(user_id)
    .await
    .map_err(store_error)?;
  Ok(Json(clients))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub client_id: Uuid,
}

/// `POST /users/:id/assignments` — granting an existing pair again succeeds
/// without creating a second row.
pub async fn assign<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  let now = Utc::now();
  state
    .store
    .assign_client(user_id, body.client_id, Some(actor.user_id), now)
    .await
    .map_err(store_error)?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::ASSIGNMENT_ADD.to_string(),
        detail: format!("client {} assigned to user {user_id}", body.client_id),
      },
      now,
    )
    .await
    .map_err(store_error)?;

  Ok(Json(json!({ "ok": true })))
}

/// `DELETE /users/:id/assignments/:client_id`
pub async fn unassign<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path((user_id, client_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor =
    authz::require(state.store.as_ref(), &caller, Action::ManageUsers).await?;

  state
    .store
    .unassign_client(user_id, client_id)
    .await
    .map_err(store_error)?;

  state
    .store
    .record_audit(
      NewAuditEvent {
        actor:  Some(actor.user_id),
        action: action::ASSIGNMENT_REMOVE.to_string(),
        detail: format!("client {client_id} unassigned from user {user_id}"),
      },
      Utc::now(),
    )
    .await
    .map_err(store_error)?;

  Ok(Json(json!({ "ok": true })))
}
