//! Persistence of the catalog document: codec, backing stores and write locking.

pub mod backend;
pub mod codec;
pub mod lock;

pub use backend::{CatalogBackend, FileBackend, MemoryBackend, StagedWrite};
pub use lock::{CycleGuard, LockStrategy, WriteLock};

/// Failure of a catalog operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing document is not a JSON array of product objects.
    #[error("catalog document is malformed: {0}")]
    MalformedDocument(String),
    /// No product matched the requested id.
    #[error("{0} not found")]
    NotFound(String),
    /// The backing document could not be read, written or locked.
    #[error("catalog I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Caller-supplied product data was rejected; nothing was written.
    #[error("invalid product data: {0}")]
    Validation(String),
    /// The catalog already holds the largest representable id.
    #[error("no product ids left after {0}")]
    IdsExhausted(u64),
}
