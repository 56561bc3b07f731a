//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enum discriminants are stored as their wire
//! strings (`active`, `super_admin`, …).

use chrono::{DateTime, Utc};
use quantdesk_core::{
  audit::AuditEvent,
  client::{Client, ClientStatus},
  profile::{Profile, Role},
  strategy::Strategy,
  subscription::{Subscription, SubscriptionDetail, SubscriptionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ClientStatus ────────────────────────────────────────────────────────────

pub fn encode_client_status(s: ClientStatus) -> &'static str {
  match s {
    ClientStatus::Active => "active",
    ClientStatus::Inactive => "inactive",
  }
}

pub fn decode_client_status(s: &str) -> Result<ClientStatus> {
  match s {
    "active" => Ok(ClientStatus::Active),
    "inactive" => Ok(ClientStatus::Inactive),
    other => Err(Error::Decode(format!("unknown client status: {other:?}"))),
  }
}

// ─── SubscriptionStatus ──────────────────────────────────────────────────────

pub fn encode_subscription_status(s: SubscriptionStatus) -> &'static str {
  match s {
    SubscriptionStatus::Active => "active",
    SubscriptionStatus::Paused => "paused",
    SubscriptionStatus::Expired => "expired",
  }
}

/// Unrecognized stored values decode to `Active` for display. The fallback
/// is tolerated on read only; writes always go through
/// [`encode_subscription_status`].
pub fn decode_subscription_status(s: &str) -> SubscriptionStatus {
  match s {
    "paused" => SubscriptionStatus::Paused,
    "expired" => SubscriptionStatus::Expired,
    _ => SubscriptionStatus::Active,
  }
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::SuperAdmin => "super_admin",
    Role::Manager => "manager",
    Role::Viewer => "viewer",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "super_admin" => Ok(Role::SuperAdmin),
    "manager" => Ok(Role::Manager),
    "viewer" => Ok(Role::Viewer),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `clients` row.
pub struct RawClient {
  pub client_id:  String,
  pub name:       String,
  pub email:      Option<String>,
  pub status:     String,
  pub created_at: String,
}

impl RawClient {
  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      client_id:  decode_uuid(&self.client_id)?,
      name:       self.name,
      email:      self.email,
      status:     decode_client_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `strategies` row.
pub struct RawStrategy {
  pub strategy_id: String,
  pub name:        String,
  pub created_at:  String,
}

impl RawStrategy {
  pub fn into_strategy(self) -> Result<Strategy> {
    Ok(Strategy {
      strategy_id: decode_uuid(&self.strategy_id)?,
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `subscriptions` row joined with the client and
/// strategy display columns.
pub struct RawSubscriptionDetail {
  pub subscription_id: String,
  pub client_id:       String,
  pub strategy_id:     String,
  pub current_aum:     Option<f64>,
  pub status:          String,
  pub start_date:      String,
  pub expiry_date:     Option<String>,
  pub created_at:      String,
  pub client_name:     String,
  pub client_email:    Option<String>,
  pub strategy_name:   String,
}

impl RawSubscriptionDetail {
  pub fn into_detail(self) -> Result<SubscriptionDetail> {
    let subscription = Subscription {
      subscription_id: decode_uuid(&self.subscription_id)?,
      client_id:       decode_uuid(&self.client_id)?,
      strategy_id:     decode_uuid(&self.strategy_id)?,
      // Missing AUM coerces to 0, matching the dashboard's defensive read.
      current_aum:     self.current_aum.unwrap_or(0.0),
      status:          decode_subscription_status(&self.status),
      start_date:      decode_dt(&self.start_date)?,
      expiry_date:     self.expiry_date.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    };

    Ok(SubscriptionDetail {
      subscription,
      client_name: self.client_name,
      client_email: self.client_email,
      strategy_name: self.strategy_name,
    })
  }
}

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:    String,
  pub full_name:  Option<String>,
  pub email:      Option<String>,
  pub role:       String,
  pub avatar_url: Option<String>,
  pub created_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:    decode_uuid(&self.user_id)?,
      full_name:  self.full_name,
      email:      self.email,
      role:       decode_role(&self.role)?,
      avatar_url: self.avatar_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `audit_events` row.
pub struct RawAuditEvent {
  pub event_id: String,
  pub at:       String,
  pub actor:    Option<String>,
  pub action:   String,
  pub detail:   String,
}

impl RawAuditEvent {
  pub fn into_event(self) -> Result<AuditEvent> {
    Ok(AuditEvent {
      event_id: decode_uuid(&self.event_id)?,
      at:       decode_dt(&self.at)?,
      actor:    self.actor.as_deref().map(decode_uuid).transpose()?,
      action:   self.action,
      detail:   self.detail,
    })
  }
}
