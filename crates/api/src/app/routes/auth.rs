use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use accessgate_infra::Workflow;

use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub async fn signup(
    Extension(workflow): Extension<Workflow>,
    body: Result<Json<dto::SignupRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match workflow.gateway.signup(body.into_new_user()).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::UserResponse { user })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(workflow): Extension<Workflow>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match workflow.gateway.login(&body.username, &body.password()).await {
        Ok((user, token)) => (StatusCode::OK, Json(dto::LoginResponse { user, token })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn me(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match workflow.gateway.current_user(caller.identity()).await {
        Ok(user) => (StatusCode::OK, Json(dto::UserResponse { user })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
