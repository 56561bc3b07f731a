//! The `FundStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `quantdesk-store-sqlite`). The API layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  audit::{AuditEvent, NewAuditEvent},
  client::{Client, ClientStatus, NewClient},
  profile::{NewProfile, Profile, Role},
  strategy::Strategy,
  subscription::{
    NewSubscription, Subscription, SubscriptionDetail, SubscriptionStatus,
  },
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Pagination parameters for [`FundStore::list_subscriptions`] and
/// [`FundStore::list_audit_events`]. The ledger grows without bound, so the
/// full-scan list of the original design is replaced with offset paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the fund-administration row store.
///
/// Time-dependent operations take an explicit `now` so expiry and
/// aggregation logic is deterministic under test; callers pass `Utc::now()`
/// in production.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FundStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Customers ─────────────────────────────────────────────────────────

  /// Create a client and its first subscription in one atomic transaction.
  ///
  /// Subscription status is forced to `active` and `start_date` is set to
  /// `now`. Fails without writing either row if `current_aum < 0` or the
  /// expiry date precedes `now`.
  fn create_customer(
    &self,
    client: NewClient,
    subscription: NewSubscription,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(Client, Subscription), Self::Error>> + Send + '_;

  /// Retrieve a client by id. Returns `None` if not found.
  fn get_client(
    &self,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// All subscriptions for a client, newest-created-first, joined with the
  /// strategy name.
  fn client_subscriptions(
    &self,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SubscriptionDetail>, Self::Error>> + Send + '_;

  /// The customer-list view: subscriptions joined with client and strategy
  /// display fields, newest-created-first.
  fn list_subscriptions(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<SubscriptionDetail>, Self::Error>> + Send + '_;

  /// Set a subscription's status. Transitions are deliberately
  /// unconstrained — staff may manually reactivate or pause regardless of
  /// dates. Returns `None` if the subscription does not exist.
  fn update_subscription_status(
    &self,
    subscription_id: Uuid,
    status: SubscriptionStatus,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Toggle a client's status flag. Returns `None` if the client does not
  /// exist.
  fn set_client_status(
    &self,
    client_id: Uuid,
    status: ClientStatus,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  // ── Expiry sweeper ────────────────────────────────────────────────────

  /// Transition every non-`expired` subscription whose expiry date is at or
  /// before `now` to `expired`. Returns the number of rows transitioned.
  /// Idempotent: re-running against already-expired rows changes nothing.
  fn expire_due(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Strategy catalog ──────────────────────────────────────────────────

  fn add_strategy(
    &self,
    name: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Strategy, Self::Error>> + Send + '_;

  fn list_strategies(
    &self,
  ) -> impl Future<Output = Result<Vec<Strategy>, Self::Error>> + Send + '_;

  // ── Aggregates — pure reads, safe to request in parallel ──────────────

  /// Sum of `current_aum` over subscriptions with status exactly `active`.
  /// Missing values coerce to 0.
  fn total_aum(
    &self,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;

  /// Count of clients (not subscriptions) flagged `active`.
  fn active_client_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Count of `active` subscriptions whose expiry date falls in the
  /// half-open window `[now, now + 7d)`. Null expiries are excluded.
  fn expiring_soon_count(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The `limit` most recently created subscriptions, joined for display.
  fn recent_subscriptions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SubscriptionDetail>, Self::Error>> + Send + '_;

  // ── Profiles & assignments ────────────────────────────────────────────

  /// Create a staff profile (the invite flow). The returned `user_id` is
  /// handed to the external identity provider for account linkage.
  fn create_profile(
    &self,
    profile: NewProfile,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// All staff profiles, newest-created-first.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Change a user's role. Returns `None` if the profile does not exist.
  fn update_role(
    &self,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Grant a manager access to a client. Granting an existing pair again is
  /// an idempotent no-op.
  fn assign_client(
    &self,
    user_id: Uuid,
    client_id: Uuid,
    assigned_by: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn unassign_client(
    &self,
    user_id: Uuid,
    client_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Client ids currently assigned to `user_id`.
  fn assigned_clients(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Audit trail ───────────────────────────────────────────────────────

  fn record_audit(
    &self,
    event: NewAuditEvent,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<AuditEvent, Self::Error>> + Send + '_;

  /// Audit events, newest-first.
  fn list_audit_events(
    &self,
    page: Page,
  ) -> impl Future<Output = Result<Vec<AuditEvent>, Self::Error>> + Send + '_;
}
