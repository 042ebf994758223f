//! Capability check applied at the HTTP boundary.
//!
//! Token verification itself belongs to the external access-control collaborator;
//! this module only resolves a bearer token into the acting user and refuses the
//! request when that fails.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::board::domain::UserId;

/// The authenticated identity attached to a request after the capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: UserId,
}

/// Resolves bearer tokens into callers. Implementations live with the
/// deployment (static token table, session service, ...).
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, token: &str) -> Result<Caller, AccessError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("missing or malformed bearer token")]
    MissingToken,
    #[error("token is not recognized")]
    Unrecognized,
}

/// Middleware guarding mutating routes. Inserts a [`Caller`] extension on
/// success so handlers can read the acting user.
pub async fn require_caller(
    State(policy): State<Arc<dyn AccessPolicy>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(unauthorized)?;

    let caller = policy.authorize(token).map_err(|_| unauthorized())?;
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "not authorized" })),
    )
        .into_response()
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
