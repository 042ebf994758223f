use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{require_caller, AccessPolicy};
use crate::board::domain::{JobId, OrgId};

use super::service::{
    JobPatch, NewJob, NewOrganization, OrganizationError, OrganizationPatch, OrganizationService,
};

/// Organization and job endpoints. Reads are open; every mutation passes
/// through the capability check.
pub fn organizations_router(
    service: Arc<OrganizationService>,
    policy: Arc<dyn AccessPolicy>,
) -> Router {
    let guarded = Router::new()
        .route("/api/v1/organizations", post(create_handler))
        .route(
            "/api/v1/organizations/:id",
            put(update_handler).delete(delete_handler),
        )
        .route("/api/v1/organizations/:id/jobs", post(create_job_handler))
        .route(
            "/api/v1/organizations/jobs/:id",
            put(update_job_handler).delete(delete_job_handler),
        )
        .route(
            "/api/v1/organizations/jobs/:id/status",
            patch(change_status_handler),
        )
        .route_layer(middleware::from_fn_with_state(policy, require_caller));

    Router::new()
        .merge(guarded)
        .route("/api/v1/organizations", get(list_handler))
        .route("/api/v1/organizations/jobs", get(all_jobs_handler))
        .route("/api/v1/organizations/:id", get(get_handler))
        .route("/api/v1/organizations/:id/jobs", get(org_jobs_handler))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
struct StatusRequest {
    #[serde(default)]
    status: Option<String>,
}

async fn create_handler(
    State(service): State<Arc<OrganizationService>>,
    axum::Json(body): axum::Json<NewOrganization>,
) -> Response {
    match service.create(body) {
        Ok(organization) => (StatusCode::CREATED, axum::Json(organization)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn get_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
) -> Response {
    match service.get(&OrgId(id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn update_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<OrganizationPatch>,
) -> Response {
    match service.update(&OrgId(id), body) {
        Ok(organization) => (StatusCode::OK, axum::Json(organization)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn delete_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete(&OrgId(id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "organization deleted successfully" })),
        )
            .into_response(),
        Err(error) => organization_response(error),
    }
}

async fn list_handler(State(service): State<Arc<OrganizationService>>) -> Response {
    match service.list() {
        Ok(organizations) => (StatusCode::OK, axum::Json(organizations)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn create_job_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<NewJob>,
) -> Response {
    match service.create_job(&OrgId(id), body) {
        Ok(job) => (StatusCode::CREATED, axum::Json(job)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn org_jobs_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
) -> Response {
    match service.jobs_for(&OrgId(id)) {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn all_jobs_handler(State(service): State<Arc<OrganizationService>>) -> Response {
    match service.all_jobs() {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn update_job_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<JobPatch>,
) -> Response {
    match service.update_job(&JobId(id), body) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(error) => organization_response(error),
    }
}

async fn delete_job_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete_job(&JobId(id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "job deleted successfully" })),
        )
            .into_response(),
        Err(error) => organization_response(error),
    }
}

async fn change_status_handler(
    State(service): State<Arc<OrganizationService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<StatusRequest>,
) -> Response {
    match service.change_status(&JobId(id), body.status) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(error) => organization_response(error),
    }
}

fn organization_response(error: OrganizationError) -> Response {
    let status = match &error {
        OrganizationError::MissingOrgFields
        | OrganizationError::MissingJobFields
        | OrganizationError::MissingStatus
        | OrganizationError::UnknownStatus => StatusCode::BAD_REQUEST,
        OrganizationError::OrganizationNotFound | OrganizationError::JobNotFound => {
            StatusCode::NOT_FOUND
        }
        OrganizationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        axum::Json(json!({ "message": error.to_string() })),
    )
        .into_response()
}
