//! Storefront server routes: rendered page, GraphQL, static assets and `/ws`.

pub mod graphql;
pub mod render;

use crate::app::{NotificationHub, ProductStore};
use crate::transport::ws;
use async_graphql_axum::GraphQL;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct StorefrontState {
    pub store: Arc<ProductStore>,
    pub template_path: PathBuf,
}

pub fn create_router(
    state: StorefrontState,
    notifications: NotificationHub,
    assets_dir: Option<PathBuf>,
) -> Router {
    let schema = graphql::build_schema(state.store.clone());
    let router = Router::new()
        .route("/mainmarket", get(render::mainmarket_handler))
        .with_state(state)
        .route(
            "/graphql",
            get(graphql::graphiql).post_service(GraphQL::new(schema)),
        )
        .merge(ws::router(notifications, ws::STOREFRONT_GREETING));
    match assets_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
