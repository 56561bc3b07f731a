//! [`SqliteStore`] — the SQLite implementation of [`FundStore`].

use std::path::Path;

use quantdesk_core::{
  audit::{AuditEvent, NewAuditEvent},
  client::{Client, ClientStatus, NewClient},
  metrics::expiring_window,
  profile::{NewProfile, Profile, Role},
  store::{FundStore, Page},
  strategy::Strategy,
  subscription::{
    NewSubscription, Subscription, SubscriptionDetail, SubscriptionStatus,
  },
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{
    RawAuditEvent, RawClient, RawProfile, RawStrategy, RawSubscriptionDetail,
    encode_client_status, encode_dt, encode_role, encode_subscription_status,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Joined select used by every customer-list shaped read.
const DETAIL_COLUMNS: &str = "
  s.subscription_id, s.client_id, s.strategy_id, s.current_aum,
  s.status, s.start_date, s.expiry_date, s.created_at,
  c.name  AS client_name,
  c.email AS client_email,
  st.name AS strategy_name
  FROM subscriptions s
  JOIN clients    c  ON c.client_id    = s.client_id
  JOIN strategies st ON st.strategy_id = s.strategy_id";

fn detail_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubscriptionDetail> {
  Ok(RawSubscriptionDetail {
    subscription_id: row.get(0)?,
    client_id:       row.get(1)?,
    strategy_id:     row.get(2)?,
    current_aum:     row.get(3)?,
    status:          row.get(4)?,
    start_date:      row.get(5)?,
    expiry_date:     row.get(6)?,
    created_at:      row.get(7)?,
    client_name:     row.get(8)?,
    client_email:    row.get(9)?,
    strategy_name:   row.get(10)?,
  })
}

fn client_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawClient> {
  Ok(RawClient {
    client_id:  row.get(0)?,
    name:       row.get(1)?,
    email:      row.get(2)?,
    status:     row.get(3)?,
    created_at: row.get(4)?,
  })
}

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    user_id:    row.get(0)?,
    full_name:  row.get(1)?,
    email:      row.get(2)?,
    role:       row.get(3)?,
    avatar_url: row.get(4)?,
    created_at: row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fund store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_client(&self, client_id: Uuid) -> Result<Option<Client>> {
    let id_str = encode_uuid(client_id);

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT client_id, name, email, status, created_at
             FROM clients WHERE client_id = ?1",
            rusqlite::params![id_str],
            client_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, full_name, email, role, avatar_url, created_at
             FROM profiles WHERE user_id = ?1",
            rusqlite::params![id_str],
            profile_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run arbitrary SQL — used by tests to plant rows the public API refuses
  /// to write (e.g. unrecognized status strings from legacy data).
  pub(crate) async fn execute_raw(&self, sql: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── FundStore impl ──────────────────────────────────────────────────────────

impl FundStore for SqliteStore {
  type Error = Error;

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn create_customer(
    &self,
    client: NewClient,
    subscription: NewSubscription,
    now: DateTime<Utc>,
  ) -> Result<(Client, Subscription)> {
    if subscription.current_aum < 0.0 {
      return Err(Error::Core(quantdesk_core::Error::NegativeAum(
        subscription.current_aum,
      )));
    }
    if let Some(expiry) = subscription.expiry_date
      && expiry < now
    {
      return Err(Error::Core(quantdesk_core::Error::ExpiryBeforeStart {
        start: now,
        expiry,
      }));
    }

    let new_client = Client {
      client_id:  Uuid::new_v4(),
      name:       client.name,
      email:      client.email,
      status:     ClientStatus::Active,
      created_at: now,
    };
    let new_sub = Subscription {
      subscription_id: Uuid::new_v4(),
      client_id:       new_client.client_id,
      strategy_id:     subscription.strategy_id,
      current_aum:     subscription.current_aum,
      status:          SubscriptionStatus::Active,
      start_date:      now,
      expiry_date:     subscription.expiry_date,
      created_at:      now,
    };

    let client_id_str   = encode_uuid(new_client.client_id);
    let client_name     = new_client.name.clone();
    let client_email    = new_client.email.clone();
    let sub_id_str      = encode_uuid(new_sub.subscription_id);
    let strategy_id_str = encode_uuid(new_sub.strategy_id);
    let aum             = new_sub.current_aum;
    let now_str         = encode_dt(now);
    let expiry_str      = new_sub.expiry_date.map(encode_dt);

    // Both inserts in one transaction: either the client and its
    // subscription both exist afterwards, or neither does.
    let strategy_exists: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let strategy_exists: bool = tx
          .query_row(
            "SELECT 1 FROM strategies WHERE strategy_id = ?1",
            rusqlite::params![strategy_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !strategy_exists {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO clients (client_id, name, email, status, created_at)
           VALUES (?1, ?2, ?3, 'active', ?4)",
          rusqlite::params![client_id_str, client_name, client_email, now_str],
        )?;

        tx.execute(
          "INSERT INTO subscriptions (
             subscription_id, client_id, strategy_id, current_aum,
             status, start_date, expiry_date, created_at
           ) VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?6, ?5)",
          rusqlite::params![
            sub_id_str,
            client_id_str,
            strategy_id_str,
            aum,
            now_str,
            expiry_str,
          ],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !strategy_exists {
      return Err(Error::StrategyNotFound(new_sub.strategy_id));
    }

    Ok((new_client, new_sub))
  }

  async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>> {
    self.fetch_client(client_id).await
  }

  async fn client_subscriptions(
    &self,
    client_id: Uuid,
  ) -> Result<Vec<SubscriptionDetail>> {
    let id_str = encode_uuid(client_id);

    let raws: Vec<RawSubscriptionDetail> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DETAIL_COLUMNS}
           WHERE s.client_id = ?1
           ORDER BY s.created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], detail_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscriptionDetail::into_detail)
      .collect()
  }

  async fn list_subscriptions(&self, page: Page) -> Result<Vec<SubscriptionDetail>> {
    let limit_val  = page.limit.unwrap_or(100) as i64;
    let offset_val = page.offset.unwrap_or(0) as i64;

    let raws: Vec<RawSubscriptionDetail> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DETAIL_COLUMNS}
           ORDER BY s.created_at DESC
           LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], detail_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubscriptionDetail::into_detail)
      .collect()
  }

  async fn update_subscription_status(
    &self,
    subscription_id: Uuid,
    status: SubscriptionStatus,
  ) -> Result<Option<Subscription>> {
    let id_str     = encode_uuid(subscription_id);
    let status_str = encode_subscription_status(status).to_owned();

    let raw: Option<RawSubscriptionDetail> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE subscriptions SET status = ?1 WHERE subscription_id = ?2",
          rusqlite::params![status_str, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let sql = format!("SELECT {DETAIL_COLUMNS} WHERE s.subscription_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], detail_from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawSubscriptionDetail::into_detail).transpose()?.map(|d| d.subscription))
  }

  async fn set_client_status(
    &self,
    client_id: Uuid,
    status: ClientStatus,
  ) -> Result<Option<Client>> {
    let id_str     = encode_uuid(client_id);
    let status_str = encode_client_status(status).to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE clients SET status = ?1 WHERE client_id = ?2",
          rusqlite::params![status_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }

    self.fetch_client(client_id).await
  }

  // ── Expiry sweeper ────────────────────────────────────────────────────────

  async fn expire_due(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions SET status = 'expired'
           WHERE status != 'expired'
             AND expiry_date IS NOT NULL
             AND expiry_date <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;

    Ok(changed as u64)
  }

  // ── Strategy catalog ──────────────────────────────────────────────────────

  async fn add_strategy(&self, name: String, now: DateTime<Utc>) -> Result<Strategy> {
    let strategy = Strategy {
      strategy_id: Uuid::new_v4(),
      name,
      created_at: now,
    };

    let id_str   = encode_uuid(strategy.strategy_id);
    let name_str = strategy.name.clone();
    let at_str   = encode_dt(strategy.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO strategies (strategy_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(strategy)
  }

  async fn list_strategies(&self) -> Result<Vec<Strategy>> {
    let raws: Vec<RawStrategy> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT strategy_id, name, created_at FROM strategies ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawStrategy {
              strategy_id: row.get(0)?,
              name:        row.get(1)?,
              created_at:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStrategy::into_strategy).collect()
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn total_aum(&self) -> Result<f64> {
    let total: f64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(COALESCE(current_aum, 0)), 0)
           FROM subscriptions WHERE status = 'active'",
          [],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(total)
  }

  async fn active_client_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM clients WHERE status = 'active'",
          [],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn expiring_soon_count(&self, now: DateTime<Utc>) -> Result<u64> {
    let (lo, hi) = expiring_window(now);
    let lo_str = encode_dt(lo);
    let hi_str = encode_dt(hi);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM subscriptions
           WHERE status = 'active'
             AND expiry_date IS NOT NULL
             AND expiry_date >= ?1
             AND expiry_date < ?2",
          rusqlite::params![lo_str, hi_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn recent_subscriptions(&self, limit: usize) -> Result<Vec<SubscriptionDetail>> {
    self
      .list_subscriptions(Page {
        limit:  Some(limit),
        offset: None,
      })
      .await
  }

  // ── Profiles & assignments ────────────────────────────────────────────────

  async fn create_profile(
    &self,
    profile: NewProfile,
    now: DateTime<Utc>,
  ) -> Result<Profile> {
    let new_profile = Profile {
      user_id:    Uuid::new_v4(),
      full_name:  profile.full_name,
      email:      profile.email,
      role:       profile.role,
      avatar_url: None,
      created_at: now,
    };

    let id_str    = encode_uuid(new_profile.user_id);
    let full_name = new_profile.full_name.clone();
    let email     = new_profile.email.clone();
    let role_str  = encode_role(new_profile.role).to_owned();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (user_id, full_name, email, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, full_name, email, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(new_profile)
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    self.fetch_profile(user_id).await
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, full_name, email, role, avatar_url, created_at
           FROM profiles ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map([], profile_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<Profile>> {
    let id_str   = encode_uuid(user_id);
    let role_str = encode_role(role).to_owned();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET role = ?1 WHERE user_id = ?2",
          rusqlite::params![role_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }

    self.fetch_profile(user_id).await
  }

  async fn assign_client(
    &self,
    user_id: Uuid,
    client_id: Uuid,
    assigned_by: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let client_str = encode_uuid(client_id);
    let by_str     = assigned_by.map(encode_uuid);
    let at_str     = encode_dt(now);

    // INSERT OR IGNORE against the (user_id, client_id) primary key makes
    // duplicate grants idempotent no-ops.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO manager_client_assignments
             (user_id, client_id, assigned_by, assigned_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_str, client_str, by_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn unassign_client(&self, user_id: Uuid, client_id: Uuid) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let client_str = encode_uuid(client_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM manager_client_assignments
           WHERE user_id = ?1 AND client_id = ?2",
          rusqlite::params![user_str, client_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn assigned_clients(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let user_str = encode_uuid(user_id);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT client_id FROM manager_client_assignments
           WHERE user_id = ?1 ORDER BY assigned_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids
      .iter()
      .map(|s| crate::encode::decode_uuid(s))
      .collect()
  }

  // ── Audit trail ───────────────────────────────────────────────────────────

  async fn record_audit(
    &self,
    event: NewAuditEvent,
    now: DateTime<Utc>,
  ) -> Result<AuditEvent> {
    let stored = AuditEvent {
      event_id: Uuid::new_v4(),
      at:       now,
      actor:    event.actor,
      action:   event.action,
      detail:   event.detail,
    };

    let id_str    = encode_uuid(stored.event_id);
    let at_str    = encode_dt(stored.at);
    let actor_str = stored.actor.map(encode_uuid);
    let action    = stored.action.clone();
    let detail    = stored.detail.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_events (event_id, at, actor, action, detail)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, at_str, actor_str, action, detail],
        )?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }

  async fn list_audit_events(&self, page: Page) -> Result<Vec<AuditEvent>> {
    let limit_val  = page.limit.unwrap_or(100) as i64;
    let offset_val = page.offset.unwrap_or(0) as i64;

    let raws: Vec<RawAuditEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, at, actor, action, detail
           FROM audit_events ORDER BY at DESC
           LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], |row| {
            Ok(RawAuditEvent {
              event_id: row.get(0)?,
              at:       row.get(1)?,
              actor:    row.get(2)?,
              action:   row.get(3)?,
              detail:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEvent::into_event).collect()
  }
}
