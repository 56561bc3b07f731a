//! Client — an end customer of the fund.
//!
//! Clients are never hard-deleted. Their status flag is toggled by staff and
//! drives the dashboard's active-client count independently of whether any
//! subscription is currently active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle flag on a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
  Active,
  Inactive,
}

/// A persisted customer record. `client_id` is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
  pub client_id:  Uuid,
  pub name:       String,
  pub email:      Option<String>,
  pub status:     ClientStatus,
  pub created_at: DateTime<Utc>,
}

/// Attributes for a client about to be created. The store assigns the UUID,
/// forces status to `active` and stamps `created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
  pub name:  String,
  pub email: Option<String>,
}
