//! One-way password digests (Argon2id).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use accessgate_core::{DomainError, DomainResult};

/// Raw password; `Debug` never prints the value.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// PHC-formatted digest as stored alongside the user.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordDigest(***)")
    }
}

/// `hash(secret) -> digest` / `verify(secret, digest) -> bool`.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, password: &Password) -> DomainResult<PasswordDigest>;

    fn verify(&self, password: &Password, digest: &PasswordDigest) -> bool;
}

#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl core::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    /// Argon2id with the crate's recommended parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with explicit memory (KiB) and iteration costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| DomainError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, password: &Password) -> DomainResult<PasswordDigest> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("failed to hash password: {e}")))?
            .to_string();
        Ok(PasswordDigest::new(digest))
    }

    fn verify(&self, password: &Password, digest: &PasswordDigest) -> bool {
        let Ok(parsed) = PasswordHash::new(digest.as_str()) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(1024, 1).unwrap()
    }

    #[test]
    fn digest_is_phc_argon2() {
        let digest = hasher().hash(&Password::new("hunter22")).unwrap();
        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(!digest.as_str().contains("hunter22"));
    }

    #[test]
    fn verify_accepts_only_the_original() {
        let h = hasher();
        let digest = h.hash(&Password::new("hunter22")).unwrap();
        assert!(h.verify(&Password::new("hunter22"), &digest));
        assert!(!h.verify(&Password::new("hunter23"), &digest));
    }

    #[test]
    fn salts_differ_per_hash() {
        let h = hasher();
        let a = h.hash(&Password::new("same-secret")).unwrap();
        let b = h.hash(&Password::new("same-secret")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_digest_never_verifies() {
        assert!(!hasher().verify(&Password::new("x"), &PasswordDigest::new("garbage")));
    }

    #[test]
    fn debug_redacts_secrets() {
        assert_eq!(format!("{:?}", Password::new("hunter22")), "Password(***)");
    }
}
