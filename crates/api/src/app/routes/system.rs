use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::dto::HealthResponse;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        app_name: &services.app_name,
    })
    .into_response()
}
