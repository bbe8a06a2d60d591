pub mod notifications;
pub mod product_store;

pub use notifications::NotificationHub;
pub use product_store::ProductStore;
