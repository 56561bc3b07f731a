//! Strategy — a named investment program subscriptions reference.
//!
//! A read-mostly catalog. Strategies are referenced, never owned, by
//! subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
  pub strategy_id: Uuid,
  pub name:        String,
  pub created_at:  DateTime<Utc>,
}
