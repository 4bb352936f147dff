//! Signup, login and token authentication.

use std::sync::Arc;

use tracing::{error, info, warn};

use accessgate_auth::{
    Identity, NewUser, Password, PasswordDigest, SecretHasher, TokenService, User, UserProfile,
    validate_credentials,
};
use accessgate_core::{Clock, DomainError, DomainResult, UserId};

use crate::store::{StoreError, UserStore};

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const DECOY_PASSWORD: &str = "accessgate-decoy-password";

#[derive(Clone)]
pub struct AuthGateway {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn SecretHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
    /// Verified against when the username is unknown, so both login
    /// failures cost one digest verification.
    decoy_digest: PasswordDigest,
}

impl AuthGateway {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn SecretHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let decoy_digest = hasher.hash(&Password::new(DECOY_PASSWORD))?;
        Ok(Self {
            users,
            hasher,
            tokens,
            clock,
            decoy_digest,
        })
    }

    /// Register a new account. Only the digest of the password is stored.
    pub async fn signup(&self, new_user: NewUser) -> DomainResult<UserProfile> {
        new_user.validate()?;
        let username = new_user.username.trim().to_string();

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::conflict("Username already exists"));
        }

        let user = User {
            id: UserId::new(),
            username,
            password_digest: self.hasher.hash(&new_user.password)?,
            role: new_user.role,
            created_at: self.clock.now(),
        };
        let profile = user.profile();

        self.users.insert(user).await.map_err(|e| match e {
            StoreError::Duplicate(_) => DomainError::conflict("Username already exists"),
            other => {
                error!(error = %other, "failed to store user");
                other.into()
            }
        })?;

        info!(user_id = %profile.id, role = %profile.role, "user signed up");
        Ok(profile)
    }

    /// Verify credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &Password) -> DomainResult<(UserProfile, String)> {
        validate_credentials(username, password)?;

        let user = self.users.find_by_username(username.trim()).await?;
        let verified = match &user {
            Some(u) => self.hasher.verify(password, &u.password_digest),
            None => {
                self.hasher.verify(password, &self.decoy_digest);
                false
            }
        };
        let Some(user) = user.filter(|_| verified) else {
            warn!("login rejected");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };

        let identity = Identity::new(user.id, user.username.clone(), user.role);
        let token = self.tokens.issue(&identity, self.clock.now())?;

        info!(user_id = %user.id, "user logged in");
        Ok((user.profile(), token))
    }

    /// Recover the caller's identity from a bearer token.
    ///
    /// A missing token is `Unauthorized`; a present but unusable one
    /// (malformed, expired, bad signature) is `Forbidden`.
    pub fn authenticate(&self, token: Option<&str>) -> DomainResult<Identity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::unauthorized("Authentication token required"))?;

        self.tokens
            .verify(token, self.clock.now())
            .map(|claims| claims.identity())
            .map_err(|e| {
                warn!(reason = %e, "token rejected");
                DomainError::forbidden("Invalid or expired token")
            })
    }

    /// Re-read the caller's account from the store.
    pub async fn current_user(&self, caller: &Identity) -> DomainResult<UserProfile> {
        self.users
            .get(caller.user_id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| DomainError::not_found("User"))
    }
}
