use crate::infra::{AppState, InMemoryBoardStore};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use talentboard::auth::AccessPolicy;
use talentboard::board::applications::{lifecycle_router, ApplicationLifecycle};
use talentboard::board::organizations::{organizations_router, OrganizationService};
use talentboard::board::users::{users_router, DirectoryService};

pub(crate) fn with_board_routes(
    lifecycle: Arc<ApplicationLifecycle<InMemoryBoardStore, InMemoryBoardStore>>,
    directory: Arc<DirectoryService>,
    organizations: Arc<OrganizationService>,
    policy: Arc<dyn AccessPolicy>,
) -> axum::Router {
    lifecycle_router(lifecycle, policy.clone())
        .merge(users_router(directory, policy.clone()))
        .merge(organizations_router(organizations, policy))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
