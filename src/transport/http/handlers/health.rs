use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Catalog document is readable", body = ApiResponse),
        (status = 503, description = "Catalog document is unreadable or malformed", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let checked_at = chrono::Utc::now().to_rfc3339();
    match state.store.list().await {
        Ok(catalog) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({
                "status": "ok",
                "document": state.store.describe(),
                "products": catalog.len(),
                "lock": state.store.lock_strategy().name(),
                "subscribers": state.notifications.subscriber_count(),
                "checked_at": checked_at,
            }))),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(serde_json::json!({
                    "status": "unhealthy",
                    "document": state.store.describe(),
                    "checked_at": checked_at,
                })),
                error: Some(e.to_string()),
            }),
        ),
    }
}
