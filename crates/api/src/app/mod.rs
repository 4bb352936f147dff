//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, hasher and token service behind a [`Workflow`]
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use accessgate_core::DomainResult;
use accessgate_infra::Workflow;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around an already wired workflow.
pub fn build_app(workflow: Workflow) -> Router {
    let auth_state = middleware::AuthState {
        gateway: workflow.gateway.clone(),
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(workflow))
        .layer(ServiceBuilder::new())
}

/// Wire services from config, then build the router (entrypoint used by `main.rs`).
pub async fn build_app_from_config(config: &AppConfig) -> DomainResult<Router> {
    let workflow = services::build_workflow(config).await?;
    Ok(build_app(workflow))
}
