use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;

use sweetshop_catalog::{NewSweet, SweetPatch, SweetQuery};
use sweetshop_core::SweetId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::authz::admin_gate;

pub fn router() -> Router {
    // Gated before extraction: a USER gets 403 whatever body they send.
    let admin = Router::new()
        .route("/", post(create_sweet))
        .route("/:id", put(update_sweet).delete(delete_sweet))
        .route("/:id/restock", post(restock_sweet))
        .route_layer(axum::middleware::from_fn(admin_gate));

    Router::new()
        .route("/", get(list_sweets))
        .route("/search", get(search_sweets))
        .route("/:id", get(get_sweet))
        .route("/:id/purchase", post(purchase_sweet))
        .merge(admin)
}

fn parse_id(raw: &str) -> Result<SweetId, axum::response::Response> {
    raw.parse().map_err(|_| errors::invalid_id())
}

pub async fn create_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewSweet>,
) -> axum::response::Response {
    match services.catalog.create(body, Utc::now()).await {
        Ok(sweet) => (StatusCode::CREATED, Json(sweet)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    match services.catalog.list(params.page()).await {
        Ok(sweets) => (StatusCode::OK, Json(sweets)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn search_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<SweetQuery>,
) -> axum::response::Response {
    match services.catalog.search(query).await {
        Ok(sweets) => (StatusCode::OK, Json(sweets)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get(id).await {
        Ok(sweet) => (StatusCode::OK, Json(sweet)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<SweetPatch>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.update(id, patch, Utc::now()).await {
        Ok(sweet) => (StatusCode::OK, Json(sweet)).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                msg: "Sweet deleted successfully",
            }),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn purchase_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.purchase(id, Utc::now()).await {
        Ok(remaining) => (StatusCode::OK, Json(dto::PurchaseResponse::new(remaining))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn restock_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.restock(id, body.amount, Utc::now()).await {
        Ok(quantity) => (StatusCode::OK, Json(dto::RestockResponse::new(quantity))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
