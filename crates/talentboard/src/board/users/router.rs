use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;

use crate::auth::{require_caller, AccessPolicy};
use crate::board::domain::UserId;

use super::service::{CvDraft, DirectoryError, DirectoryService, NewUser, UserPatch};

/// Directory endpoints. Registration and reads are public; edits, deletes,
/// and CV mutations pass through the capability check.
pub fn users_router(service: Arc<DirectoryService>, policy: Arc<dyn AccessPolicy>) -> Router {
    let guarded = Router::new()
        .route("/api/v1/users", put(edit_handler))
        .route("/api/v1/users/:id", delete(delete_handler))
        .route(
            "/api/v1/users/:id/cv",
            post(create_cv_handler)
                .put(upsert_cv_handler)
                .delete(delete_cv_handler),
        )
        .route_layer(middleware::from_fn_with_state(policy, require_caller));

    Router::new()
        .merge(guarded)
        .route("/api/v1/users", post(create_handler).get(list_handler))
        .route("/api/v1/users/get/recruiters", get(recruiters_handler))
        .route("/api/v1/users/get/applicants", get(applicants_handler))
        .route("/api/v1/users/:id", get(get_handler))
        .route("/api/v1/users/:id/cv", get(get_cv_handler))
        .route("/api/v1/users/:id/organization", get(organization_handler))
        .with_state(service)
}

async fn create_handler(
    State(service): State<Arc<DirectoryService>>,
    axum::Json(body): axum::Json<NewUser>,
) -> Response {
    match service.create(body) {
        Ok(user) => (
            StatusCode::CREATED,
            axum::Json(json!({
                "message": "user created successfully",
                "user": user,
            })),
        )
            .into_response(),
        Err(error) => directory_response(error),
    }
}

async fn list_handler(State(service): State<Arc<DirectoryService>>) -> Response {
    match service.list() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn get_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> Response {
    match service.get(&UserId(id)) {
        Ok(user) => (StatusCode::OK, axum::Json(user)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn edit_handler(
    State(service): State<Arc<DirectoryService>>,
    axum::Json(body): axum::Json<UserPatch>,
) -> Response {
    match service.edit(body) {
        Ok(user) => (
            StatusCode::OK,
            axum::Json(json!({
                "message": "user updated",
                "user": user,
            })),
        )
            .into_response(),
        Err(error) => directory_response(error),
    }
}

async fn delete_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete(&UserId(id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "user deleted successfully" })),
        )
            .into_response(),
        Err(error) => directory_response(error),
    }
}

async fn get_cv_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> Response {
    match service.cv_of(&UserId(id)) {
        Ok(cv) => (StatusCode::OK, axum::Json(cv)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn create_cv_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<CvDraft>,
) -> Response {
    match service.create_cv(&UserId(id), body) {
        Ok(cv) => (StatusCode::CREATED, axum::Json(cv)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn upsert_cv_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<CvDraft>,
) -> Response {
    match service.upsert_cv(&UserId(id), body) {
        Ok(cv) => (StatusCode::OK, axum::Json(cv)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn delete_cv_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete_cv(&UserId(id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "cv deleted successfully" })),
        )
            .into_response(),
        Err(error) => directory_response(error),
    }
}

async fn organization_handler(
    State(service): State<Arc<DirectoryService>>,
    Path(id): Path<String>,
) -> Response {
    match service.organization_of(&UserId(id)) {
        Ok(organization) => (StatusCode::OK, axum::Json(organization)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn recruiters_handler(State(service): State<Arc<DirectoryService>>) -> Response {
    match service.recruiters() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => directory_response(error),
    }
}

async fn applicants_handler(State(service): State<Arc<DirectoryService>>) -> Response {
    match service.applicants() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => directory_response(error),
    }
}

fn directory_response(error: DirectoryError) -> Response {
    let status = match &error {
        DirectoryError::MissingFields
        | DirectoryError::InvalidUserName
        | DirectoryError::InvalidEmail
        | DirectoryError::MissingUserId => StatusCode::BAD_REQUEST,
        DirectoryError::EmailTaken
        | DirectoryError::UserNameTaken
        | DirectoryError::CvExists => StatusCode::CONFLICT,
        DirectoryError::UserNotFound
        | DirectoryError::CvNotFound
        | DirectoryError::RoleNotFound(_)
        | DirectoryError::NoOrganization
        | DirectoryError::OrganizationNotFound => StatusCode::NOT_FOUND,
        DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        axum::Json(json!({ "message": error.to_string() })),
    )
        .into_response()
}
