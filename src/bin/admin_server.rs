// src/bin/admin_server.rs

use shared_catalog::infra::{config, logging};
use shared_catalog::storage::FileBackend;
use shared_catalog::transport;
use shared_catalog::{NotificationHub, ProductStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    // --- Store Initialization ---
    let catalog_path = config::catalog_path();
    let strategy = config::lock_strategy()?;
    let store = Arc::new(ProductStore::new(
        Arc::new(FileBackend::new(&catalog_path)),
        strategy,
    ));
    let startup = store.startup_snapshot().await;
    info!(
        document = %store.describe(),
        products = startup.len(),
        lock = store.lock_strategy().name(),
        "product store ready"
    );

    let app_state = transport::http::AppState {
        store,
        notifications: NotificationHub::new(),
    };

    // --- API Server Initialization ---
    let addr = config::admin_addr()?;
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Admin server running on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Admin WebSocket available at ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
