//! Session token payload decoding.
//!
//! DESIGN
//! ======
//! The client can read a token's payload but never verify its signature, so
//! this module answers "should the client stop trusting this token", not "is
//! this token authentic". Any decode failure counts as expired.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::clock::system_now_ms;
use crate::profile::id_from_value;
use crate::role::Role;

/// Error returned by [`decode`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Not a `header.payload.signature` string.
    #[error("token must have 3 dot-separated segments, found {0}")]
    Segments(usize),
    /// The payload segment is not base64url.
    #[error("token payload is not valid base64")]
    Base64,
    /// The payload is not a JSON object with a numeric `exp`.
    #[error("token payload is not valid claims JSON: {0}")]
    Claims(String),
}

/// Readable claims carried by a session token.
///
/// Only `exp` is required. The other claims are informational, so a value of
/// an unexpected shape reads as absent instead of failing the decode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    /// Expiry instant in Unix seconds. Fractional values are floored.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
}

impl TokenClaims {
    #[must_use]
    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(id_from_value(Value::deserialize(deserializer)?).unwrap_or(None))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.parse().ok()),
        _ => Ok(None),
    }
}

/// RFC 7519 NumericDate: integer or fractional seconds.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(secs) = value.as_i64() {
        return Ok(secs);
    }
    match value.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(secs) if secs.is_finite() => Ok(secs.floor() as i64),
        _ => Err(D::Error::custom(format!("exp must be a number, got {value}"))),
    }
}

/// Decode the payload segment of `token` without verifying its signature.
///
/// Standard-alphabet and padded payloads are accepted alongside base64url.
///
/// # Errors
///
/// Returns an error if the token is not three segments, the payload is not
/// base64, or the decoded JSON lacks a numeric `exp`.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Segments(segments.len()));
    }

    let payload: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .map_err(|_| TokenError::Base64)?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Expiry instant of `token` in epoch milliseconds, if readable.
#[must_use]
pub fn expires_at_ms(token: &str) -> Option<i64> {
    decode(token).ok().map(|claims| claims.expires_at_ms())
}

/// Whether the client should stop trusting `token` at `now_ms`.
///
/// Unreadable tokens are always expired.
#[must_use]
pub fn is_expired_at(token: &str, now_ms: i64) -> bool {
    match decode(token) {
        Ok(claims) => now_ms >= claims.expires_at_ms(),
        Err(e) => {
            debug!(error = %e, "unreadable session token treated as expired");
            true
        }
    }
}

/// [`is_expired_at`] against the system clock.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, system_now_ms())
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
