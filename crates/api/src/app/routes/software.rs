use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use accessgate_auth::Action;
use accessgate_core::SoftwareId;
use accessgate_infra::Workflow;

use crate::app::{dto, errors};
use crate::authz::authorize_action;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_software).get(list_software))
        .route("/:id", get(get_software))
}

pub async fn create_software(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateSoftwareRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(res) = authorize_action(&workflow.policy, &caller, Action::CreateSoftware) {
        return res;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match workflow.catalog.create_software(caller.identity(), body.into()).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_software(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match workflow.catalog.list(caller.identity()).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_software(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SoftwareId = match errors::parse_id(&id, "software") {
        Ok(v) => v,
        Err(res) => return res,
    };

    match workflow.catalog.get(caller.identity(), id).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
