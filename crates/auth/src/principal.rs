use serde::{Deserialize, Serialize};

use accessgate_core::UserId;

use crate::Role;

/// Caller identity recovered from a verified token.
///
/// Passed explicitly to every workflow operation; there is no ambient session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}
