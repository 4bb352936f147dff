use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use accessgate_infra::Workflow;

use crate::app::errors;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

/// Any authenticated caller may read the counts.
pub async fn stats(
    Extension(workflow): Extension<Workflow>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match workflow.reporter.dashboard_stats(caller.identity()).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
