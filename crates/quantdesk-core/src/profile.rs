//! Profile — a staff operator identity, keyed by the external identity
//! provider's user id.
//!
//! The stored role is the sole authorization signal. Every privileged
//! operation re-fetches it at call time; a role carried in a request is
//! never trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles, in descending order of privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  SuperAdmin,
  Manager,
  Viewer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  /// Shared with the external identity provider's user id.
  pub user_id:    Uuid,
  pub full_name:  Option<String>,
  pub email:      Option<String>,
  pub role:       Role,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Attributes for a profile created through the invite flow. The identity
/// provider links its account to the returned `user_id` out of band.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub full_name: Option<String>,
  pub email:     Option<String>,
  pub role:      Role,
}

/// A manager's access grant to a single client.
///
/// The `(user_id, client_id)` pair is unique; granting it twice is an
/// idempotent no-op, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerClientAssignment {
  pub user_id:     Uuid,
  pub client_id:   Uuid,
  pub assigned_by: Option<Uuid>,
  pub assigned_at: DateTime<Utc>,
}
