// src/bin/storefront_server.rs

use shared_catalog::infra::{config, logging};
use shared_catalog::storage::FileBackend;
use shared_catalog::transport::storefront::{self, StorefrontState};
use shared_catalog::{NotificationHub, ProductStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    let catalog_path = config::catalog_path();
    let store = Arc::new(ProductStore::new(
        Arc::new(FileBackend::new(&catalog_path)),
        config::lock_strategy()?,
    ));
    let startup = store.startup_snapshot().await;
    info!(document = %store.describe(), products = startup.len(), "product store ready");

    let template_path = config::storefront_template();
    if !template_path.exists() {
        warn!(template = %template_path.display(), "storefront template not found, /mainmarket will fail until it exists");
    }
    let assets = config::storefront_assets();
    let assets_dir = if assets.is_dir() {
        Some(assets)
    } else {
        warn!(assets = %assets.display(), "static asset directory not found, serving no static files");
        None
    };

    let state = StorefrontState {
        store,
        template_path,
    };
    let app = storefront::create_router(state, NotificationHub::new(), assets_dir)
        .layer(TraceLayer::new_for_http());

    let addr = config::storefront_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Store server running on http://{}", addr);
    info!("Storefront page at http://{}/mainmarket, GraphQL at http://{}/graphql", addr, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
