//! Per-call role derivation.
//!
//! Every privileged handler calls [`require`] first. The caller's role is
//! re-fetched from the profile store on each request — the policy never
//! trusts a role carried in a request body or cached client-side.

use quantdesk_core::{
  policy::{self, Action},
  profile::Profile,
  store::FundStore,
};

use crate::{
  auth::Caller,
  error::{ApiError, store_error},
};

/// Fetch the caller's stored profile and check it against the rule table.
///
/// An unknown caller id is `Unauthorized`; an insufficient role is
/// `Forbidden` with a descriptive reason. Nothing is mutated on failure.
pub async fn require<S>(
  store: &S,
  caller: &Caller,
  action: Action,
) -> Result<Profile, ApiError>
where
  S: FundStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = store
    .get_profile(caller.0)
    .await
    .map_err(store_error)?
    .ok_or(ApiError::Unauthorized)?;

  policy::check(profile.role, action)?;
  Ok(profile)
}
