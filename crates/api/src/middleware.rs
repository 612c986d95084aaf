use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use sweetshop_auth::AuthService;

use crate::app::errors;

#[derive(Clone)]
pub struct AuthState {
    pub auth: AuthService,
}

/// Resolve the bearer token to an `Identity` and attach it to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let identity = {
        let token = extract_bearer(req.headers())
            .ok_or_else(|| errors::unauthenticated("unauthenticated", "not authenticated"))?;

        state
            .auth
            .authenticate(token, Utc::now())
            .await
            .map_err(errors::auth_error_to_response)?
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;

    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}
