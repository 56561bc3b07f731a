//! Error types for `quantdesk-core`.
//!
//! Missing rows are not errors: lookups return `Option` and the presentation
//! layer turns `None` into a not-found state. These variants cover domain
//! invariant violations only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("AUM must be non-negative, got {0}")]
  NegativeAum(f64),

  #[error("expiry date {expiry} is before start date {start}")]
  ExpiryBeforeStart {
    start:  chrono::DateTime<chrono::Utc>,
    expiry: chrono::DateTime<chrono::Utc>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
