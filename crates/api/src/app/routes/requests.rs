use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use accessgate_auth::Action;
use accessgate_core::RequestId;
use accessgate_infra::Workflow;

use crate::app::{dto, errors};
use crate::authz::authorize_action;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_request))
        .route("/my", get(list_my_requests))
        .route("/pending", get(list_pending_requests))
        .route("/:id", patch(decide_request))
}

pub async fn create_request(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateAccessRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(res) = authorize_action(&workflow.policy, &caller, Action::CreateRequest) {
        return res;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let (software_id, access_type, reason) = match body.required() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match workflow
        .requests
        .create_request(caller.identity(), software_id, access_type, &reason)
        .await
    {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_my_requests(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match workflow.requests.list_mine(caller.identity()).await {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_pending_requests(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match workflow.requests.list_pending(caller.identity()).await {
        Ok(requests) => (StatusCode::OK, Json(requests)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn decide_request(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::DecideRequestBody>, JsonRejection>,
) -> axum::response::Response {
    if let Err(res) = authorize_action(&workflow.policy, &caller, Action::DecideRequest) {
        return res;
    }
    let id: RequestId = match errors::parse_id(&id, "request") {
        Ok(v) => v,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let decision = match body.decision() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match workflow.requests.decide(caller.identity(), id, decision).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
