pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{NotificationHub, ProductStore};
pub use domain::{Catalog, Category, Product};
pub use storage::{LockStrategy, StoreError};
