//! Domain error model.
//!
//! One taxonomy is shared by every layer; the HTTP boundary maps each variant
//! to exactly one status code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// A single failed input rule, reported back to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl core::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Domain-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input; carries every violated rule.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// Well-formed input that is not acceptable for the referenced entity.
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing or invalid credentials / token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not permit the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness or state-transition violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected store or infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Turn a list of collected violations into a result.
    pub fn check(violations: Vec<FieldViolation>) -> DomainResult<()> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(violations))
        }
    }

    /// Short machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }
}
