//! Caller-identity extractor and the cron shared-secret verifier.
//!
//! Authentication itself is delegated to the external identity layer, which
//! terminates the session and forwards the authenticated user id in the
//! `x-caller-id` header. This module only establishes *who* is calling; what
//! they may do is decided per-call in [`crate::authz`] from their stored
//! profile.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use quantdesk_core::store::FundStore;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header installed by the identity layer in front of this service.
pub const CALLER_HEADER: &str = "x-caller-id";

/// The authenticated caller's user id. Present in a handler signature means
/// the request carried a well-formed identity.
pub struct Caller(pub Uuid);

/// Pull the caller id out of the headers.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  let value = headers
    .get(CALLER_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  Uuid::parse_str(value).map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: FundStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    caller_from_headers(&parts.headers).map(Caller)
  }
}

// ─── Cron secret ─────────────────────────────────────────────────────────────

/// Verify the scheduled trigger's `Authorization: Bearer <secret>` header
/// against the configured secret, byte for byte.
///
/// Fails closed: a missing server-side secret is a configuration error, not
/// a skipped check. Both failure modes reject before any mutation runs.
pub fn verify_cron_secret(
  headers: &HeaderMap,
  configured: Option<&str>,
) -> Result<(), ApiError> {
  let secret = configured
    .ok_or_else(|| ApiError::Config("cron secret not configured".to_string()))?;

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let presented = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)?;

  if presented != secret {
    return Err(ApiError::Unauthorized);
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers_with_bearer(secret: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {secret}")).unwrap(),
    );
    headers
  }

  #[test]
  fn correct_secret() {
    let headers = headers_with_bearer("s3cret");
    assert!(verify_cron_secret(&headers, Some("s3cret")).is_ok());
  }

  #[test]
  fn mismatched_secret() {
    let headers = headers_with_bearer("wrong");
    assert!(matches!(
      verify_cron_secret(&headers, Some("s3cret")),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let headers = HeaderMap::new();
    assert!(matches!(
      verify_cron_secret(&headers, Some("s3cret")),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn non_bearer_scheme_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_static("Basic s3cret"),
    );
    assert!(matches!(
      verify_cron_secret(&headers, Some("s3cret")),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn unconfigured_secret_fails_closed() {
    let headers = headers_with_bearer("anything");
    assert!(matches!(
      verify_cron_secret(&headers, None),
      Err(ApiError::Config(_))
    ));
  }

  #[test]
  fn caller_header_round_trip() {
    let id = Uuid::new_v4();
    let mut headers = HeaderMap::new();
    headers.insert(
      CALLER_HEADER,
      HeaderValue::from_str(&id.to_string()).unwrap(),
    );
    assert_eq!(caller_from_headers(&headers).unwrap(), id);
  }

  #[test]
  fn missing_or_malformed_caller_is_unauthorized() {
    let headers = HeaderMap::new();
    assert!(matches!(
      caller_from_headers(&headers),
      Err(ApiError::Unauthorized)
    ));

    let mut headers = HeaderMap::new();
    headers.insert(CALLER_HEADER, HeaderValue::from_static("not-a-uuid"));
    assert!(matches!(
      caller_from_headers(&headers),
      Err(ApiError::Unauthorized)
    ));
  }
}
