use crate::transport::http::handlers::{health, products};
use crate::transport::http::types::{ApiResponse, AppState, NewProductDoc, ProductDoc};
use crate::transport::ws;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Admin API", version = "1.0.0", description = "API for managing products"),
    paths(
        health::healthcheck_handler,
        products::list_products_handler,
        products::create_products_handler,
        products::get_product_handler,
        products::products_by_category_handler,
        products::update_product_handler,
        products::delete_product_handler
    ),
    components(schemas(ApiResponse, ProductDoc, NewProductDoc))
)]
#[allow(dead_code)]
pub struct ApiDoc;

/// Admin REST routes plus the admin `/ws` channel.
pub fn create_router(app_state: AppState) -> Router {
    let notifications = app_state.notifications.clone();
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/products",
            get(products::list_products_handler).post(products::create_products_handler),
        )
        .route(
            "/products/:id",
            get(products::get_product_handler)
                .put(products::update_product_handler)
                .delete(products::delete_product_handler),
        )
        .route(
            "/products/category/:category",
            get(products::products_by_category_handler),
        )
        .with_state(app_state)
        .merge(ws::router(notifications, ws::ADMIN_GREETING))
}
