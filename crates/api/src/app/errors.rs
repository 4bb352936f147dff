use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use accessgate_core::{DomainError, FieldViolation};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = err.code();
    match err {
        DomainError::Validation(violations) => validation_error(&violations),
        DomainError::InvalidArgument(msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
        DomainError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, code, msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, code, msg),
        e @ DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, code, e.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, code, msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "Internal server error")
        }
    }
}

pub fn validation_error(violations: &[FieldViolation]) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": "Validation error",
            "errors": violations,
        })),
    )
        .into_response()
}

/// Unreadable JSON bodies are the caller's fault, whatever axum would pick.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering 400 on garbage.
pub fn parse_id<T: core::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
