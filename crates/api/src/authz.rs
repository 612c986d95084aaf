//! API-side role guard.
//!
//! `admin_gate` sits behind the auth middleware as a route layer, so it runs
//! before any handler extractor reads the request body.

use axum::{middleware::Next, response::Response};

use sweetshop_auth::{Identity, Role, require_role};

use crate::app::errors;

/// Reject non-admin callers with 403.
pub fn require_admin(identity: &Identity) -> Result<(), Response> {
    require_role(identity, Role::Admin).map_err(errors::authz_error_to_response)
}

/// Route layer for admin-only endpoints.
pub async fn admin_gate(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| errors::unauthenticated("unauthenticated", "not authenticated"))?;
    require_admin(identity)?;

    Ok(next.run(req).await)
}
