use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use accessgate_core::UserId;

use crate::{Identity, Role};

/// Claims embedded in an identity token.
///
/// Timestamps are Unix seconds (`iat` / `exp`) so standard JWT tooling can
/// read them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: identity.user_id,
            username: identity.username.clone(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.username.clone(), self.role)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token is malformed: {0}")]
    Malformed(String),
}

/// Deterministically validate the claim time window.
///
/// Signature verification happens in [`crate::token`]; this only checks times.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(now: DateTime<Utc>) -> TokenClaims {
        let identity = Identity::new(UserId::new(), "alice", Role::Employee);
        TokenClaims::new(&identity, now, now + Duration::hours(24))
    }

    #[test]
    fn fresh_claims_are_valid() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now), Ok(()));
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let later = now + Duration::hours(24);
        assert_eq!(
            validate_claims(&claims_at(now), later),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_claims_are_rejected() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims_at(now), now - Duration::minutes(5)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.exp = claims.iat;
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
