use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use sweetshop_auth::{Identity, RegisterUser};

use crate::app::dto::LoginForm;
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUser>,
) -> axum::response::Response {
    match services.auth.register(body, Utc::now()).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => errors::credential_error_to_response(e),
    }
}

pub async fn token(
    Extension(services): Extension<Arc<AppServices>>,
    LoginForm(body): LoginForm,
) -> axum::response::Response {
    match services
        .auth
        .login(&body.username, &body.password, Utc::now())
        .await
    {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => errors::credential_error_to_response(e),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.auth.profile(&identity).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
