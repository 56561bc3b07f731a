//! JSON REST API for the Quantdesk fund-administration dashboard.
//!
//! Exposes an axum [`Router`] backed by any [`quantdesk_core::store::FundStore`].
//! The external identity layer authenticates staff and forwards the caller's
//! user id in the `x-caller-id` header; TLS and transport concerns are the
//! deployment's responsibility.

pub mod audit;
pub mod auth;
pub mod authz;
pub mod cron;
pub mod customers;
pub mod dashboard;
pub mod error;
pub mod strategies;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use quantdesk_core::store::FundStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (or the
/// `QUANTDESK_*` environment).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Shared secret the external cron trigger presents as a bearer token.
  /// When unset the expiry-sweep endpoint refuses to run (fails closed).
  pub cron_secret: Option<String>,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: FundStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Dashboard
    .route("/dashboard", get(dashboard::summary::<S>))
    // Customers & the subscription ledger
    .route(
      "/customers",
      get(customers::list::<S>).post(customers::create::<S>),
    )
    .route("/customers/{client_id}", get(customers::get_one::<S>))
    .route("/clients/{client_id}/status", post(customers::set_client_status::<S>))
    .route("/subscriptions/{id}/status", post(customers::update_status::<S>))
    // Strategy catalog
    .route(
      "/strategies",
      get(strategies::list::<S>).post(strategies::create::<S>),
    )
    // Staff & assignments
    .route("/users", get(users::list::<S>))
    .route("/users/invite", post(users::invite::<S>))
    .route("/users/{id}/role", post(users::set_role::<S>))
    .route(
      "/users/{id}/assignments",
      get(users::assignments::<S>).post(users::assign::<S>),
    )
    .route(
      "/users/{id}/assignments/{client_id}",
      delete(users::unassign::<S>),
    )
    // Audit trail
    .route("/audit", get(audit::list::<S>))
    // Expiry sweeper trigger
    .route("/cron/expire-subscriptions", get(cron::expire::<S>))
    .with_state(state)
}
