use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::decode_header;
use serde::Deserialize;

// Only the expiry matters here; every other claim is ignored.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// expires_at
///
/// Reads the `exp` claim of a JWT without verifying its signature. The storefront
/// never holds the backend's signing key; this is a convenience for the UI only.
/// The payload is decoded directly, so any signing algorithm works.
/// Returns `None` for malformed tokens or tokens without `exp`.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    // Rejects anything that is not a JWT header, whatever its algorithm.
    let header = decode_header(token).ok()?;

    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: ExpiryClaims = match serde_json::from_slice(&bytes) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(alg = ?header.alg, error = %e, "JWT payload is not readable");
            return None;
        }
    };
    DateTime::from_timestamp(claims.exp?, 0)
}

/// is_token_expired
///
/// True when the token's `exp` is at or before `now`, or when the expiry cannot be read.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Some(exp) => exp <= now,
        None => true,
    }
}
