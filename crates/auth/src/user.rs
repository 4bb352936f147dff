//! User accounts (identity store records).

use chrono::{DateTime, Utc};
use serde::Serialize;

use accessgate_core::{DomainError, DomainResult, FieldViolation, UserId};

use crate::{Password, PasswordDigest, Role};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stored user record.
///
/// Deliberately not `Serialize`: the digest must never reach a response body.
/// Use [`User::profile`] for anything that leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_digest: PasswordDigest,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Signup input, validated before anything is hashed or stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: Password,
    pub confirm_password: Option<Password>,
    pub role: Role,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Password::new(password),
            confirm_password: None,
            role: Role::Employee,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_confirmation(mut self, confirm: impl Into<String>) -> Self {
        self.confirm_password = Some(Password::new(confirm));
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = credential_violations(&self.username, &self.password);

        if let Some(confirm) = &self.confirm_password {
            if confirm.as_str() != self.password.as_str() {
                violations.push(FieldViolation::new("confirmPassword", "Passwords do not match"));
            }
        }

        DomainError::check(violations)
    }
}

/// Shape check shared by signup and login.
pub fn validate_credentials(username: &str, password: &Password) -> DomainResult<()> {
    DomainError::check(credential_violations(username, password))
}

fn credential_violations(username: &str, password: &Password) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if username.trim().chars().count() < MIN_USERNAME_LEN {
        violations.push(FieldViolation::new(
            "username",
            format!("Username must be at least {MIN_USERNAME_LEN} characters"),
        ));
    }
    if password.as_str().chars().count() < MIN_PASSWORD_LEN {
        violations.push(FieldViolation::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    violations
}
