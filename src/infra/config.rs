//! Centralized configuration (environment variables + defaults).
//!
//! Call `dotenv::dotenv().ok()` before reading these so a `.env` file applies.

use crate::storage::{FileBackend, LockStrategy};
use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Path of the catalog document shared by the admin and storefront servers.
pub fn catalog_path() -> PathBuf {
    PathBuf::from(env_or("CATALOG_PATH", "products.json"))
}

/// How long a writer waits for another process's advisory lock.
pub fn lock_timeout() -> anyhow::Result<Duration> {
    let raw = env_or("CATALOG_LOCK_TIMEOUT_MS", "5000");
    let ms = raw
        .parse::<u64>()
        .with_context(|| format!("CATALOG_LOCK_TIMEOUT_MS must be a number of milliseconds, got {:?}", raw))?;
    Ok(Duration::from_millis(ms))
}

/// `CATALOG_LOCK=advisory` (default) or `CATALOG_LOCK=process`.
pub fn lock_strategy() -> anyhow::Result<LockStrategy> {
    match env_or("CATALOG_LOCK", "advisory").to_lowercase().as_str() {
        "advisory" => Ok(LockStrategy::Advisory {
            path: FileBackend::new(catalog_path()).lock_path(),
            timeout: lock_timeout()?,
        }),
        "process" => Ok(LockStrategy::ProcessLocal),
        other => anyhow::bail!("CATALOG_LOCK must be `advisory` or `process`, got {:?}", other),
    }
}

fn socket_addr(key: &str, default: &str) -> anyhow::Result<SocketAddr> {
    let raw = env_or(key, default);
    raw.parse()
        .with_context(|| format!("{} must be a socket address like 0.0.0.0:8080, got {:?}", key, raw))
}

pub fn admin_addr() -> anyhow::Result<SocketAddr> {
    socket_addr("ADMIN_ADDR", "0.0.0.0:8080")
}

pub fn storefront_addr() -> anyhow::Result<SocketAddr> {
    socket_addr("STOREFRONT_ADDR", "0.0.0.0:3000")
}

/// HTML page containing the `<!-- PRODUCTS_HERE -->` placeholder.
pub fn storefront_template() -> PathBuf {
    PathBuf::from(env_or("STOREFRONT_TEMPLATE", "storefront/index.html"))
}

/// Directory served as static files by the storefront.
pub fn storefront_assets() -> PathBuf {
    PathBuf::from(env_or("STOREFRONT_ASSETS", "storefront"))
}
