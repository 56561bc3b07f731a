//! Audit events — append-only records of staff and sweeper activity.
//!
//! Events are never updated or deleted. Actor is `None` for machine-driven
//! mutations (the expiry sweeper).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The machine-readable action discriminants written to the audit trail.
pub mod action {
  pub const CUSTOMER_CREATE: &str = "customer.create";
  pub const SUBSCRIPTION_STATUS: &str = "subscription.status";
  pub const CLIENT_STATUS: &str = "client.status";
  pub const ROLE_CHANGE: &str = "role.change";
  pub const ASSIGNMENT_ADD: &str = "assignment.add";
  pub const ASSIGNMENT_REMOVE: &str = "assignment.remove";
  pub const USER_INVITE: &str = "user.invite";
  pub const SWEEP_RUN: &str = "sweep.run";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
  pub event_id: Uuid,
  pub at:       DateTime<Utc>,
  /// The staff user that performed the action; `None` for the sweeper.
  pub actor:    Option<Uuid>,
  /// One of the constants in [`action`].
  pub action:   String,
  pub detail:   String,
}

/// An audit event about to be recorded. The store assigns the UUID and
/// stamps `at`.
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
  pub actor:  Option<Uuid>,
  pub action: String,
  pub detail: String,
}
