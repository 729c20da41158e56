use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT access token without verifying it.
///
/// Tokens are opaque to the client; this only serves to skip requests that
/// would certainly be rejected. Anything that is not a three-part JWT with a
/// numeric `exp` yields `None`.
pub fn access_token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: ExpiryClaims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// True when the token carries an expiry that falls within `skew` of `now`.
pub fn expires_within(token: &str, skew: Duration, now: DateTime<Utc>) -> bool {
    access_token_expiry(token)
        .map(|expires_at| now + skew >= expires_at)
        .unwrap_or(false)
}
