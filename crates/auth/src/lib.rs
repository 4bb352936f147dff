//! `accessgate-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it owns the
//! role model, the capability table, token claims and password digests.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{AccessPolicy, authorize};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use password::{Argon2Hasher, Password, PasswordDigest, SecretHasher};
pub use permissions::Action;
pub use principal::Identity;
pub use roles::Role;
pub use token::{Hs256TokenService, TokenService};
pub use user::{NewUser, User, UserProfile, validate_credentials};
