use accessgate_auth::{Identity, Role};
use accessgate_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware and present for every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    identity: Identity,
}

impl CallerContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}
