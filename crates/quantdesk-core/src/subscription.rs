//! Subscription — the central mutable entity linking a client to a strategy.
//!
//! Subscriptions carry the AUM amount and the expiry date the sweeper acts
//! on. History is additive: a subscription is superseded by a newer one,
//! never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle status of a subscription.
///
/// New writes only accept these three values. Unrecognized values read back
/// from storage decode to `Active` for display purposes; that fallback is
/// tolerated, not a valid state to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  Active,
  Paused,
  Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub client_id:       Uuid,
  pub strategy_id:     Uuid,
  /// Assets under management, in dollars. Always >= 0.
  pub current_aum:     f64,
  pub status:          SubscriptionStatus,
  pub start_date:      DateTime<Utc>,
  pub expiry_date:     Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
}

/// Attributes for a subscription about to be created alongside a new client.
///
/// The store forces status to `active`, sets `start_date` to the injected
/// "now" and validates `current_aum >= 0` and `expiry_date >= start_date`
/// before writing anything.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
  pub strategy_id: Uuid,
  pub current_aum: f64,
  pub expiry_date: Option<DateTime<Utc>>,
}

/// A subscription joined with the client and strategy display fields the
/// customer list renders. Computed on read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDetail {
  pub subscription:  Subscription,
  pub client_name:   String,
  pub client_email:  Option<String>,
  pub strategy_name: String,
}
