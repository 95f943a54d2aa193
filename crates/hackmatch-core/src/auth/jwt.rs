//! Local inspection of JWT access tokens.
//!
//! Only the payload is decoded; the signature is left for the backend to
//! check. The result is used to decide whether a token is worth sending,
//! never to grant anything on its own.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token has no expiry claim")]
    MissingExpiry,
}

#[derive(Debug, Clone, Deserialize)]
struct RawClaims {
    exp: Option<serde_json::Value>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    user_id: Option<serde_json::Value>,
}

/// Claims read from an access token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub expires_at: DateTime<Utc>,
    pub username: Option<String>,
    pub user_id: Option<String>,
}

impl AccessClaims {
    /// Decode the payload segment of `token` without verifying it.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_sig), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected 3 segments".into()));
        };

        // Some encoders keep the padding even though JWT forbids it
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenError::Malformed(format!("payload base64: {}", e)))?;

        let raw: RawClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| TokenError::Malformed(format!("payload json: {}", e)))?;

        let exp = raw
            .exp
            .as_ref()
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .ok_or(TokenError::MissingExpiry)?;

        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| TokenError::Malformed(format!("exp out of range: {}", exp)))?;

        let user_id = raw.user_id.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(Self {
            expires_at,
            username: raw.username,
            user_id,
        })
    }

    /// A token is expired once `now` reaches its `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Seconds remaining, clamped at zero (for display)
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Build an unsigned token with the given payload. Test helper shared by the
/// auth modules.
#[cfg(test)]
pub(crate) fn test_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.signature", header, body)
}

/// Token expiring `secs` seconds after `now` (negative for the past)
#[cfg(test)]
pub(crate) fn token_expiring_in(now: DateTime<Utc>, secs: i64) -> String {
    test_token(serde_json::json!({
        "token_type": "access",
        "exp": now.timestamp() + secs,
        "user_id": 42,
        "username": "ann",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_decode_valid_token() {
        let now = Utc::now();
        let token = token_expiring_in(now, 300);
        let claims = AccessClaims::decode(&token).expect("decodable token");

        assert_eq!(claims.expires_at.timestamp(), now.timestamp() + 300);
        assert_eq!(claims.username.as_deref(), Some("ann"));
        assert_eq!(claims.user_id.as_deref(), Some("42"));
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::seconds(300)));
        assert_eq!(claims.seconds_until_expiry(now + Duration::seconds(1000)), 0);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert!(matches!(AccessClaims::decode(""), Err(TokenError::Malformed(_))));
        assert!(matches!(AccessClaims::decode("a.b"), Err(TokenError::Malformed(_))));
        assert!(matches!(AccessClaims::decode("a.b.c.d"), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        assert!(matches!(
            AccessClaims::decode("hdr.!!!.sig"),
            Err(TokenError::Malformed(_))
        ));

        let not_json = format!("hdr.{}.sig", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(matches!(AccessClaims::decode(&not_json), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_decode_requires_exp() {
        let token = test_token(serde_json::json!({"username": "ann"}));
        assert_eq!(AccessClaims::decode(&token), Err(TokenError::MissingExpiry));

        let token = test_token(serde_json::json!({"exp": "soon"}));
        assert_eq!(AccessClaims::decode(&token), Err(TokenError::MissingExpiry));
    }

    #[test]
    fn test_decode_accepts_padded_payload() {
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp": 1}"#);
        let claims = AccessClaims::decode(&format!("h.{}.s", body)).expect("padded payload decodes");
        assert_eq!(claims.expires_at.timestamp(), 1);
    }
}
