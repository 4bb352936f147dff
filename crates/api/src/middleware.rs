use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use accessgate_infra::AuthGateway;

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub gateway: AuthGateway,
}

/// Resolve the bearer token into a [`CallerContext`].
///
/// No token: 401. A token that does not verify: 403.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let identity = state
        .gateway
        .authenticate(extract_bearer(req.headers()))
        .map_err(errors::domain_error_to_response)?;

    req.extensions_mut().insert(CallerContext::new(identity));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
