use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use sweetshop_catalog::Page;

// -------------------------
// Request DTOs
// -------------------------

/// Login credentials; `username` carries the email address.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Accepts `LoginRequest` as JSON or as an urlencoded form.
#[derive(Debug)]
pub struct LoginForm(pub LoginRequest);

#[axum::async_trait]
impl<S> FromRequest<S> for LoginForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(LoginForm(body))
        } else {
            let Json(body) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(LoginForm(body))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ListParams {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub app_name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub msg: &'static str,
    pub remaining_quantity: i64,
}

impl PurchaseResponse {
    pub fn new(remaining_quantity: i64) -> Self {
        Self {
            msg: "Purchase successful",
            remaining_quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestockResponse {
    pub msg: &'static str,
    pub new_quantity: i64,
}

impl RestockResponse {
    pub fn new(new_quantity: i64) -> Self {
        Self {
            msg: "Restock successful",
            new_quantity,
        }
    }
}
