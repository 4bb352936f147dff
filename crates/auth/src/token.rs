//! Signed identity tokens (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};

use accessgate_core::{DomainError, DomainResult};

use crate::{Identity, TokenClaims, TokenValidationError, validate_claims};

/// Issues and verifies self-contained identity tokens.
///
/// Verification is pure: it never consults a user store, so a role change only
/// takes effect for tokens issued afterwards.
pub trait TokenService: Send + Sync {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> DomainResult<String>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError>;
}

#[derive(Clone)]
pub struct Hs256TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenService {
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(Self::DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for Hs256TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService for Hs256TokenService {
    fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> DomainResult<String> {
        let claims = TokenClaims::new(identity, now, now + self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {e}")))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError> {
        // Expiry is checked against the injected clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenValidationError::BadSignature,
                _ => TokenValidationError::Malformed(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgate_core::UserId;

    use crate::Role;

    fn identity() -> Identity {
        Identity::new(UserId::new(), "mgr", Role::Manager)
    }

    #[test]
    fn issued_token_carries_identity() {
        let svc = Hs256TokenService::new(b"secret");
        let now = Utc::now();
        let who = identity();

        let token = svc.issue(&who, now).unwrap();
        let claims = svc.verify(&token, now).unwrap();

        assert_eq!(claims.identity(), who);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_expires_after_ttl() {
        let svc = Hs256TokenService::new(b"secret");
        let now = Utc::now();
        let token = svc.issue(&identity(), now).unwrap();

        let err = svc.verify(&token, now + Duration::hours(25)).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn other_secret_is_a_bad_signature() {
        let now = Utc::now();
        let token = Hs256TokenService::new(b"one").issue(&identity(), now).unwrap();

        let err = Hs256TokenService::new(b"two").verify(&token, now).unwrap_err();
        assert_eq!(err, TokenValidationError::BadSignature);
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = Hs256TokenService::new(b"secret");
        let err = svc.verify("not.a.token", Utc::now()).unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }
}
