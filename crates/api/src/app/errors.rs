//! Consistent JSON error responses.
//!
//! Business rejections map to 4xx with a stable `error` code. Infrastructure
//! failures are logged here and surface as an opaque 500.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{debug, error};

use sweetshop_auth::{AuthError, AuthzError, CredentialError};
use sweetshop_catalog::CatalogError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401 with the `WWW-Authenticate: Bearer` challenge.
pub fn unauthenticated(code: &'static str, message: impl Into<String>) -> axum::response::Response {
    let mut res = json_error(StatusCode::UNAUTHORIZED, code, message);
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

pub fn internal_error(err: impl std::fmt::Display) -> axum::response::Response {
    error!(error = %err, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn invalid_id() -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid sweet id")
}

pub fn credential_error_to_response(err: CredentialError) -> axum::response::Response {
    match err {
        CredentialError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        CredentialError::DuplicateEmail => json_error(
            StatusCode::CONFLICT,
            "email_already_registered",
            "email already registered",
        ),
        CredentialError::InvalidCredentials => {
            unauthenticated("invalid_credentials", "incorrect email or password")
        }
        e @ (CredentialError::Password(_)
        | CredentialError::Token(_)
        | CredentialError::Store(_)) => internal_error(e),
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Store(e) => internal_error(e),
        other => {
            debug!(reason = %other, "bearer token rejected");
            unauthenticated("unauthenticated", "could not validate credentials")
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "sweet not found"),
        e @ CatalogError::OutOfStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "out_of_stock", e.to_string())
        }
        CatalogError::Store(e) => internal_error(e),
    }
}
