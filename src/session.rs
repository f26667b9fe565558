//! Stateless session tokens.
//!
//! A login issues one HS256-signed token binding `{email, name, role}` with
//! a fixed validity window. Nothing is stored server-side: logout only
//! deletes the cookie, and a replayed token stays valid until its natural
//! expiry.

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::db::repositories::user::Role;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Claims embedded in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Display name.
    pub name: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Signing/verification keys plus token lifetime, built once from config
/// and shared across request handling.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &str, ttl_minutes: u64) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact; the default 60s leeway would stretch the window.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds: i64::try_from(ttl_minutes * 60).unwrap_or(3600),
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token valid from now for the configured lifetime.
    pub fn issue(&self, email: &str, name: &str, role: Role) -> Result<String> {
        self.issue_at(email, name, role, Utc::now().timestamp())
    }

    /// Issue a token with an explicit issue time.
    pub fn issue_at(&self, email: &str, name: &str, role: Role, issued_at: i64) -> Result<String> {
        let claims = Claims {
            sub: email.to_string(),
            name: name.to_string(),
            role,
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign session token: {e}"))
    }

    /// Verify a presented token.
    ///
    /// Bad signature, expiry, and malformed input all collapse to `None`:
    /// callers treat every failure as "not authenticated" without
    /// distinguishing why.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret", 60)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = keys();
        let token = keys.issue("ops@example.com", "Ops", Role::Admin).unwrap();

        let claims = keys.verify(&token).expect("fresh token verifies");
        assert_eq!(claims.sub, "ops@example.com");
        assert_eq!(claims.name, "Ops");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_valid_before_expiry_rejected_after() {
        let keys = keys();
        let now = Utc::now().timestamp();

        // Issued 59 minutes ago: one minute of validity left.
        let token = keys
            .issue_at("ops@example.com", "Ops", Role::User, now - 59 * 60)
            .unwrap();
        assert!(keys.verify(&token).is_some());

        // Issued 61 minutes ago: expired one minute ago.
        let token = keys
            .issue_at("ops@example.com", "Ops", Role::User, now - 61 * 60)
            .unwrap();
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn test_failure_modes_collapse() {
        let keys = keys();

        assert!(keys.verify("").is_none());
        assert!(keys.verify("not-a-jwt").is_none());

        let other = SessionKeys::new("different-secret", 60);
        let token = other.issue("ops@example.com", "Ops", Role::User).unwrap();
        assert!(keys.verify(&token).is_none());
    }
}
