//! Dashboard aggregation — derived figures, recomputed on demand.
//!
//! Nothing here is ever persisted. The store computes the scalar aggregates
//! with SQL; this module holds the pure pieces (the MRR heuristic, the
//! expiring-soon window) and the assembled summary type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subscription::{SubscriptionDetail, SubscriptionStatus};

/// Placeholder monthly management-fee assumption: 0.2% of AUM. Not derived
/// from per-subscription fee schedules.
pub const MONTHLY_FEE_RATE: f64 = 0.002;

/// How far ahead the expiring-soon count looks.
pub const EXPIRING_WINDOW_DAYS: i64 = 7;

/// Estimated monthly recurring revenue for a given total AUM.
pub fn estimated_mrr(total_aum: f64) -> f64 { total_aum * MONTHLY_FEE_RATE }

/// The half-open window `[now, now + 7d)` a subscription's expiry date must
/// fall in to count as expiring soon.
pub fn expiring_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
  (now, now + Duration::days(EXPIRING_WINDOW_DAYS))
}

/// A recent subscription flattened to the display record the dashboard's
/// client list renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentClient {
  pub client_id:   Uuid,
  pub name:        String,
  pub strategy:    String,
  pub aum:         f64,
  pub status:      SubscriptionStatus,
  pub expiry:      Option<DateTime<Utc>>,
}

impl From<&SubscriptionDetail> for RecentClient {
  fn from(d: &SubscriptionDetail) -> Self {
    RecentClient {
      client_id: d.subscription.client_id,
      name:      d.client_name.clone(),
      strategy:  d.strategy_name.clone(),
      aum:       d.subscription.current_aum,
      status:    d.subscription.status,
      expiry:    d.subscription.expiry_date,
    }
  }
}

/// The dashboard read model. Every field is recomputed from the ledger on
/// each request; there is no cache to go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
  /// Sum of `current_aum` over subscriptions with status exactly `active`.
  pub total_aum:      f64,
  /// Count of clients (not subscriptions) flagged `active`.
  pub active_clients: u64,
  /// Active subscriptions expiring within [`expiring_window`].
  pub expiring_soon:  u64,
  /// [`estimated_mrr`] of `total_aum`.
  pub est_mrr:        f64,
  /// The 5 most recently created subscriptions, flattened.
  pub recent:         Vec<RecentClient>,
}
