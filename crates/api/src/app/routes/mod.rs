use axum::{Router, routing::get};

pub mod auth;
pub mod dashboard;
pub mod requests;
pub mod software;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new().nest("/api/auth", auth::public_router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/software", software::router())
        .nest("/api/requests", requests::router())
        .nest("/api/dashboard", dashboard::router())
}
