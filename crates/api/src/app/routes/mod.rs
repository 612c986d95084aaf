use axum::{Router, routing::get};

pub mod auth;
pub mod sweets;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/api/sweets", sweets::router())
}
