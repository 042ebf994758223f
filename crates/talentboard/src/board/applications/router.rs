use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{require_caller, AccessPolicy, Caller};
use crate::board::domain::{ApplicationOutcome, JobId, UserId};
use crate::board::store::{JobStore, UserStore};

use super::service::{ApplicationLifecycle, LifecycleError};

/// Router exposing the lifecycle endpoints. Mutating routes pass through the
/// capability check; the listings are open reads.
pub fn lifecycle_router<U, J>(
    service: Arc<ApplicationLifecycle<U, J>>,
    policy: Arc<dyn AccessPolicy>,
) -> Router
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    let guarded = Router::new()
        .route("/api/v1/jobs/:job_id/apply", post(apply_handler::<U, J>))
        .route(
            "/api/v1/jobs/:job_id/shortlist",
            put(shortlist_handler::<U, J>),
        )
        .route(
            "/api/v1/users/:id/application-status",
            patch(resolution_handler::<U, J>),
        )
        .route_layer(middleware::from_fn_with_state(policy, require_caller));

    Router::new()
        .merge(guarded)
        .route(
            "/api/v1/jobs/:job_id/applicants",
            get(applicants_handler::<U, J>),
        )
        .route(
            "/api/v1/jobs/:job_id/shortlisted",
            get(shortlisted_handler::<U, J>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShortlistRequest {
    #[serde(default)]
    pub(crate) applicant_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResolutionRequest {
    #[serde(default)]
    pub(crate) job_id: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) async fn apply_handler<U, J>(
    State(service): State<Arc<ApplicationLifecycle<U, J>>>,
    Extension(caller): Extension<Caller>,
    Path(job_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    match service.apply(&JobId(job_id), &caller.user) {
        Ok(user) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "job application submitted successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(error) => lifecycle_response(error),
    }
}

pub(crate) async fn shortlist_handler<U, J>(
    State(service): State<Arc<ApplicationLifecycle<U, J>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<ShortlistRequest>,
) -> Response
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    let Some(applicant_id) = body.applicant_id.filter(|id| !id.is_empty()) else {
        return bad_request("applicant id is required");
    };

    match service.shortlist(&JobId(job_id), &UserId(applicant_id)) {
        Ok(user) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "applicant shortlisted successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(error) => lifecycle_response(error),
    }
}

pub(crate) async fn resolution_handler<U, J>(
    State(service): State<Arc<ApplicationLifecycle<U, J>>>,
    Path(user_id): Path<String>,
    axum::Json(body): axum::Json<ResolutionRequest>,
) -> Response
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    let (Some(job_id), Some(status)) = (
        body.job_id.filter(|id| !id.is_empty()),
        body.status.filter(|status| !status.is_empty()),
    ) else {
        return bad_request("job id and status are required");
    };

    // Parse before touching the document; an invalid status must not clear
    // prior outcome state.
    let Some(outcome) = ApplicationOutcome::parse(&status) else {
        return bad_request("application status must be 'accepted' or 'rejected'");
    };

    match service.resolve(&UserId(user_id), &JobId(job_id), outcome) {
        Ok(user) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "application status updated",
                "user": user,
            })),
        )
            .into_response(),
        Err(error) => lifecycle_response(error),
    }
}

pub(crate) async fn applicants_handler<U, J>(
    State(service): State<Arc<ApplicationLifecycle<U, J>>>,
    Path(job_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    match service.applicants(&JobId(job_id)) {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => lifecycle_response(error),
    }
}

pub(crate) async fn shortlisted_handler<U, J>(
    State(service): State<Arc<ApplicationLifecycle<U, J>>>,
    Path(job_id): Path<String>,
) -> Response
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    match service.shortlisted(&JobId(job_id)) {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => lifecycle_response(error),
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "message": message })),
    )
        .into_response()
}

fn lifecycle_response(error: LifecycleError) -> Response {
    let status = match &error {
        LifecycleError::JobNotFound | LifecycleError::ApplicantNotFound => StatusCode::NOT_FOUND,
        LifecycleError::AlreadyApplied
        | LifecycleError::NotApplied
        | LifecycleError::AlreadyShortlisted => StatusCode::CONFLICT,
        LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        axum::Json(json!({ "message": error.to_string() })),
    )
        .into_response()
}
