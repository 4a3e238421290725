//! Bearer-token verification for the command endpoint.

use axum::http::{HeaderMap, header};

use crate::error::Error;

/// Check the `Authorization: Bearer <token>` header against the configured
/// token.
pub fn verify_bearer(headers: &HeaderMap, token: &str) -> Result<(), Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let presented = value.strip_prefix("Bearer ").ok_or(Error::Unauthorized)?;

  if constant_time_eq(presented.as_bytes(), token.as_bytes()) {
    Ok(())
  } else {
    Err(Error::Unauthorized)
  }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
