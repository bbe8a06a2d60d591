use crate::app::{NotificationHub, ProductStore};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProductStore>,
    pub notifications: NotificationHub,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub type ApiReply = (StatusCode, Json<ApiResponse>);
pub type ApiResult = Result<ApiReply, ApiReply>;

/// A stored product as returned by the API (documentation schema).
///
/// Any additional fields a caller stored are returned unchanged.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "title": "Hammer",
    "price": 12.5,
    "description": "Steel claw hammer",
    "category": ["tools", "outdoor"],
    "imageUrl": "https://example.com/hammer.png"
}))]
pub struct ProductDoc {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    /// Either a single label or a list of labels.
    #[schema(value_type = Object)]
    pub category: Option<JsonValue>,
    pub image_url: Option<String>,
}

/// Body of `POST /products`: one product object or an array of them.
///
/// `id` is assigned by the server; a supplied `id` is ignored.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!([{"title": "Hammer", "price": 12.5, "category": "tools"}]))]
pub struct NewProductDoc {
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub category: Option<JsonValue>,
    pub image_url: Option<String>,
}

pub fn json_400(err: JsonRejection, expected: &str) -> ApiReply {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(format!(
            "Invalid JSON body: {} (expected: {})",
            err.body_text(),
            expected
        ))),
    )
}

pub fn path_400(err: PathRejection) -> ApiReply {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(format!(
            "Invalid product id: {}",
            err.body_text()
        ))),
    )
}
