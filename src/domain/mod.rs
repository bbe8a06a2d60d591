//! Domain types for the shared product catalog.

pub mod product;

pub use product::{next_id, validate_draft, Catalog, Category, Product};
