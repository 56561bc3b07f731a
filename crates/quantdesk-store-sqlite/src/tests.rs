//! Integration tests for `SqliteStore` against an in-memory database.
//!
//! All time-dependent operations take an explicit `now`, so every test runs
//! against fixed timestamps.

use chrono::{DateTime, Duration, TimeZone, Utc};
use quantdesk_core::{
  audit::NewAuditEvent,
  client::{ClientStatus, NewClient},
  metrics::estimated_mrr,
  profile::{NewProfile, Role},
  store::{FundStore, Page},
  strategy::Strategy,
  subscription::{NewSubscription, SubscriptionStatus},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A fixed "now" all tests hang their clocks on.
fn t0() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

async fn seed_strategy(s: &SqliteStore, name: &str) -> Strategy {
  s.add_strategy(name.to_string(), t0()).await.unwrap()
}

fn new_client(name: &str) -> NewClient {
  NewClient {
    name:  name.to_string(),
    email: Some(format!("{}@example.com", name.to_lowercase())),
  }
}

fn new_sub(
  strategy_id: Uuid,
  aum: f64,
  expiry: Option<DateTime<Utc>>,
) -> NewSubscription {
  NewSubscription {
    strategy_id,
    current_aum: aum,
    expiry_date: expiry,
  }
}

// ─── Customer creation ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_customer_creates_client_and_subscription() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha Long/Short").await;

  let now = t0();
  let expiry = now + Duration::days(365);
  let (client, sub) = s
    .create_customer(
      new_client("Wang"),
      new_sub(strategy.strategy_id, 1_000_000.0, Some(expiry)),
      now,
    )
    .await
    .unwrap();

  assert_eq!(client.status, ClientStatus::Active);
  assert_eq!(sub.status, SubscriptionStatus::Active);
  assert_eq!(sub.client_id, client.client_id);
  assert_eq!(sub.start_date, now);
  assert_eq!(sub.current_aum, 1_000_000.0);
  assert_eq!(sub.expiry_date, Some(expiry));

  // Aggregates move by exactly one client and one million AUM.
  assert_eq!(s.total_aum().await.unwrap(), 1_000_000.0);
  assert_eq!(s.active_client_count().await.unwrap(), 1);

  let fetched = s.get_client(client.client_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Wang");

  let subs = s.client_subscriptions(client.client_id).await.unwrap();
  assert_eq!(subs.len(), 1);
  assert_eq!(subs[0].strategy_name, "Alpha Long/Short");
  assert_eq!(subs[0].client_name, "Wang");
}

#[tokio::test]
async fn create_customer_rejects_negative_aum() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  let err = s
    .create_customer(
      new_client("Bad"),
      new_sub(strategy.strategy_id, -5.0, None),
      t0(),
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(quantdesk_core::Error::NegativeAum(_))
  ));

  // Nothing was written.
  assert_eq!(s.active_client_count().await.unwrap(), 0);
  assert!(s.list_subscriptions(Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_customer_rejects_expiry_before_start() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  let err = s
    .create_customer(
      new_client("Late"),
      new_sub(strategy.strategy_id, 100.0, Some(t0() - Duration::days(1))),
      t0(),
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(quantdesk_core::Error::ExpiryBeforeStart { .. })
  ));
}

#[tokio::test]
async fn create_customer_unknown_strategy_writes_neither_row() {
  let s = store().await;

  let err = s
    .create_customer(
      new_client("Orphan"),
      new_sub(Uuid::new_v4(), 100.0, None),
      t0(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StrategyNotFound(_)));

  // The transaction left no orphaned client behind.
  assert_eq!(s.active_client_count().await.unwrap(), 0);
}

#[tokio::test]
async fn get_client_missing_returns_none() {
  let s = store().await;
  assert!(s.get_client(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Listing & pagination ────────────────────────────────────────────────────

#[tokio::test]
async fn list_subscriptions_newest_first_with_pagination() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  for (i, name) in ["First", "Second", "Third"].iter().enumerate() {
    s.create_customer(
      new_client(name),
      new_sub(strategy.strategy_id, 100.0, None),
      t0() + Duration::minutes(i as i64),
    )
    .await
    .unwrap();
  }

  let all = s.list_subscriptions(Page::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].client_name, "Third");
  assert_eq!(all[2].client_name, "First");

  let page = s
    .list_subscriptions(Page {
      limit:  Some(2),
      offset: Some(0),
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
  assert_eq!(page[0].client_name, "Third");

  let rest = s
    .list_subscriptions(Page {
      limit:  Some(2),
      offset: Some(2),
    })
    .await
    .unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].client_name, "First");
}

// ─── Status updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_subscription_status_is_unconstrained() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  let (_, sub) = s
    .create_customer(
      new_client("Wang"),
      new_sub(strategy.strategy_id, 100.0, None),
      t0(),
    )
    .await
    .unwrap();

  // active -> expired -> active: staff may reactivate regardless of dates.
  let updated = s
    .update_subscription_status(sub.subscription_id, SubscriptionStatus::Expired)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, SubscriptionStatus::Expired);

  let updated = s
    .update_subscription_status(sub.subscription_id, SubscriptionStatus::Active)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn update_subscription_status_missing_returns_none() {
  let s = store().await;
  let result = s
    .update_subscription_status(Uuid::new_v4(), SubscriptionStatus::Paused)
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn unknown_stored_status_decodes_as_active() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  s.create_customer(
    new_client("Legacy"),
    new_sub(strategy.strategy_id, 100.0, None),
    t0(),
  )
  .await
  .unwrap();

  // Plant a status string no current writer produces.
  s.execute_raw("UPDATE subscriptions SET status = 'legacy_hold'".to_string())
    .await
    .unwrap();

  let all = s.list_subscriptions(Page::default()).await.unwrap();
  assert_eq!(all[0].subscription.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn set_client_status_toggles_and_missing_returns_none() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  let (client, _) = s
    .create_customer(
      new_client("Wang"),
      new_sub(strategy.strategy_id, 100.0, None),
      t0(),
    )
    .await
    .unwrap();

  let updated = s
    .set_client_status(client.client_id, ClientStatus::Inactive)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, ClientStatus::Inactive);

  assert!(
    s.set_client_status(Uuid::new_v4(), ClientStatus::Active)
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Expiry sweeper ──────────────────────────────────────────────────────────

#[tokio::test]
async fn expire_due_transitions_past_expiries_and_is_idempotent() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  let start = t0();

  let (_, due) = s
    .create_customer(
      new_client("Due"),
      new_sub(strategy.strategy_id, 100.0, Some(start + Duration::days(10))),
      start,
    )
    .await
    .unwrap();
  let (_, paused_due) = s
    .create_customer(
      new_client("PausedDue"),
      new_sub(strategy.strategy_id, 100.0, Some(start + Duration::days(5))),
      start,
    )
    .await
    .unwrap();
  s.update_subscription_status(paused_due.subscription_id, SubscriptionStatus::Paused)
    .await
    .unwrap();
  let (_, open_ended) = s
    .create_customer(
      new_client("OpenEnded"),
      new_sub(strategy.strategy_id, 100.0, None),
      start,
    )
    .await
    .unwrap();
  let (_, not_yet) = s
    .create_customer(
      new_client("NotYet"),
      new_sub(strategy.strategy_id, 100.0, Some(start + Duration::days(90))),
      start,
    )
    .await
    .unwrap();

  // Sweep 30 days in: both past-expiry rows transition, paused included.
  let swept = s.expire_due(start + Duration::days(30)).await.unwrap();
  assert_eq!(swept, 2);

  let all = s.list_subscriptions(Page::default()).await.unwrap();
  let status_of = |id: Uuid| {
    all
      .iter()
      .find(|d| d.subscription.subscription_id == id)
      .unwrap()
      .subscription
      .status
  };
  assert_eq!(status_of(due.subscription_id), SubscriptionStatus::Expired);
  assert_eq!(
    status_of(paused_due.subscription_id),
    SubscriptionStatus::Expired
  );
  assert_eq!(status_of(open_ended.subscription_id), SubscriptionStatus::Active);
  assert_eq!(status_of(not_yet.subscription_id), SubscriptionStatus::Active);

  // Re-running is a no-op.
  let swept_again = s.expire_due(start + Duration::days(30)).await.unwrap();
  assert_eq!(swept_again, 0);
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn total_aum_counts_only_active_subscriptions() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  s.create_customer(
    new_client("Active"),
    new_sub(strategy.strategy_id, 1_000_000.0, None),
    t0(),
  )
  .await
  .unwrap();
  let (_, paused) = s
    .create_customer(
      new_client("Paused"),
      new_sub(strategy.strategy_id, 5_000_000.0, None),
      t0(),
    )
    .await
    .unwrap();
  let (_, expired) = s
    .create_customer(
      new_client("Expired"),
      new_sub(strategy.strategy_id, 9_000_000.0, None),
      t0(),
    )
    .await
    .unwrap();

  s.update_subscription_status(paused.subscription_id, SubscriptionStatus::Paused)
    .await
    .unwrap();
  s.update_subscription_status(expired.subscription_id, SubscriptionStatus::Expired)
    .await
    .unwrap();

  // Large paused/expired AUM never contributes.
  assert_eq!(s.total_aum().await.unwrap(), 1_000_000.0);
}

#[tokio::test]
async fn expiring_soon_window_is_half_open_over_seven_days() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  let now = t0();

  // Inside the window.
  s.create_customer(
    new_client("Soon"),
    new_sub(strategy.strategy_id, 100.0, Some(now + Duration::days(3))),
    now,
  )
  .await
  .unwrap();
  // Just past the window.
  s.create_customer(
    new_client("Later"),
    new_sub(strategy.strategy_id, 100.0, Some(now + Duration::days(8))),
    now,
  )
  .await
  .unwrap();
  // No expiry at all.
  s.create_customer(
    new_client("OpenEnded"),
    new_sub(strategy.strategy_id, 100.0, None),
    now,
  )
  .await
  .unwrap();
  // Inside the window but paused.
  let (_, paused) = s
    .create_customer(
      new_client("Paused"),
      new_sub(strategy.strategy_id, 100.0, Some(now + Duration::days(2))),
      now,
    )
    .await
    .unwrap();
  s.update_subscription_status(paused.subscription_id, SubscriptionStatus::Paused)
    .await
    .unwrap();

  assert_eq!(s.expiring_soon_count(now).await.unwrap(), 1);

  // An expiry exactly at the window's upper bound is excluded: from now-4d
  // the window is [now-4d, now+3d) and "Soon" sits exactly on the bound.
  assert_eq!(
    s.expiring_soon_count(now - Duration::days(4)).await.unwrap(),
    0
  );
  // The lower bound is included: from now+3d both "Soon" (on the bound) and
  // "Later" (now inside) count.
  assert_eq!(
    s.expiring_soon_count(now + Duration::days(3)).await.unwrap(),
    2
  );
}

#[tokio::test]
async fn active_client_count_follows_the_client_flag_not_subscriptions() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  // A client whose only subscription is paused still counts as active:
  // the flag on the client row is the source of this metric.
  let (client, sub) = s
    .create_customer(
      new_client("Flagged"),
      new_sub(strategy.strategy_id, 100.0, None),
      t0(),
    )
    .await
    .unwrap();
  s.update_subscription_status(sub.subscription_id, SubscriptionStatus::Paused)
    .await
    .unwrap();
  assert_eq!(s.active_client_count().await.unwrap(), 1);

  // Only the client-status toggle moves the count.
  s.set_client_status(client.client_id, ClientStatus::Inactive)
    .await
    .unwrap();
  assert_eq!(s.active_client_count().await.unwrap(), 0);
}

#[tokio::test]
async fn recent_subscriptions_returns_newest_five() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  for i in 0..6 {
    s.create_customer(
      new_client(&format!("Client{i}")),
      new_sub(strategy.strategy_id, 100.0, None),
      t0() + Duration::minutes(i),
    )
    .await
    .unwrap();
  }

  let recent = s.recent_subscriptions(5).await.unwrap();
  assert_eq!(recent.len(), 5);
  assert_eq!(recent[0].client_name, "Client5");
  assert_eq!(recent[4].client_name, "Client1");
}

#[tokio::test]
async fn estimated_mrr_tracks_total_aum_with_no_staleness() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;

  s.create_customer(
    new_client("A"),
    new_sub(strategy.strategy_id, 1_000_000.0, None),
    t0(),
  )
  .await
  .unwrap();
  assert_eq!(estimated_mrr(s.total_aum().await.unwrap()), 2_000.0);

  // Another million of AUM moves the next recomputation immediately.
  s.create_customer(
    new_client("B"),
    new_sub(strategy.strategy_id, 1_000_000.0, None),
    t0(),
  )
  .await
  .unwrap();
  assert_eq!(estimated_mrr(s.total_aum().await.unwrap()), 4_000.0);
}

// ─── Profiles, roles & assignments ───────────────────────────────────────────

#[tokio::test]
async fn create_and_update_profile_roles() {
  let s = store().await;

  let profile = s
    .create_profile(
      NewProfile {
        full_name: Some("Odette Liu".to_string()),
        email:     Some("odette@example.com".to_string()),
        role:      Role::Viewer,
      },
      t0(),
    )
    .await
    .unwrap();
  assert_eq!(profile.role, Role::Viewer);

  let fetched = s.get_profile(profile.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.role, Role::Viewer);

  let promoted = s
    .update_role(profile.user_id, Role::Manager)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(promoted.role, Role::Manager);

  assert!(
    s.update_role(Uuid::new_v4(), Role::Viewer)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn list_profiles_newest_first() {
  let s = store().await;

  for (i, name) in ["First", "Second"].iter().enumerate() {
    s.create_profile(
      NewProfile {
        full_name: Some(name.to_string()),
        email:     None,
        role:      Role::Viewer,
      },
      t0() + Duration::minutes(i as i64),
    )
    .await
    .unwrap();
  }

  let profiles = s.list_profiles().await.unwrap();
  assert_eq!(profiles.len(), 2);
  assert_eq!(profiles[0].full_name.as_deref(), Some("Second"));
}

#[tokio::test]
async fn duplicate_assignment_is_an_idempotent_no_op() {
  let s = store().await;
  let strategy = seed_strategy(&s, "Alpha").await;
  let (client, _) = s
    .create_customer(
      new_client("Wang"),
      new_sub(strategy.strategy_id, 100.0, None),
      t0(),
    )
    .await
    .unwrap();
  let manager = s
    .create_profile(
      NewProfile {
        full_name: None,
        email:     None,
        role:      Role::Manager,
      },
      t0(),
    )
    .await
    .unwrap();
  let admin = s
    .create_profile(
      NewProfile {
        full_name: None,
        email:     None,
        role:      Role::SuperAdmin,
      },
      t0(),
    )
    .await
    .unwrap();

  // Both grants succeed; exactly one row exists.
  s.assign_client(manager.user_id, client.client_id, Some(admin.user_id), t0())
    .await
    .unwrap();
  s.assign_client(manager.user_id, client.client_id, Some(admin.user_id), t0())
    .await
    .unwrap();

  let assigned = s.assigned_clients(manager.user_id).await.unwrap();
  assert_eq!(assigned, vec![client.client_id]);

  // Removal is idempotent too.
  s.unassign_client(manager.user_id, client.client_id)
    .await
    .unwrap();
  s.unassign_client(manager.user_id, client.client_id)
    .await
    .unwrap();
  assert!(s.assigned_clients(manager.user_id).await.unwrap().is_empty());
}

// ─── Audit trail ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_events_list_newest_first_with_pagination() {
  let s = store().await;

  for i in 0..3 {
    s.record_audit(
      NewAuditEvent {
        actor:  None,
        action: "sweep.run".to_string(),
        detail: format!("run {i}"),
      },
      t0() + Duration::minutes(i),
    )
    .await
    .unwrap();
  }

  let all = s.list_audit_events(Page::default()).await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(all[0].detail, "run 2");
  assert!(all[0].actor.is_none());

  let page = s
    .list_audit_events(Page {
      limit:  Some(1),
      offset: Some(1),
    })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].detail, "run 1");
}
