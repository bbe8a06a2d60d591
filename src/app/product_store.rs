//! The Product Store.
//!
//! Sole owner of the catalog document. Every call re-reads the document; every
//! mutation is one read-modify-write cycle under the `WriteLock`:
//! 1.  read and decode the current catalog,
//! 2.  apply one change (ids come from the catalog just read, never a cache),
//! 3.  encode and atomically replace the document.
//!
//! A call either completes all three steps or leaves the document untouched.

use crate::domain::{next_id, validate_draft, Catalog, Product};
use crate::storage::codec;
use crate::storage::{CatalogBackend, FileBackend, LockStrategy, StoreError, WriteLock};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ProductStore {
    backend: Arc<dyn CatalogBackend>,
    lock: WriteLock,
}

impl ProductStore {
    pub fn new(backend: Arc<dyn CatalogBackend>, strategy: LockStrategy) -> Self {
        Self {
            backend,
            lock: WriteLock::new(strategy),
        }
    }

    /// Store over a document on disk, optionally guarded by `<path>.lock`.
    pub fn for_file(path: impl Into<PathBuf>, advisory: Option<std::time::Duration>) -> Self {
        let backend = FileBackend::new(path);
        let strategy = match advisory {
            Some(timeout) => LockStrategy::Advisory {
                path: backend.lock_path(),
                timeout,
            },
            None => LockStrategy::ProcessLocal,
        };
        Self::new(Arc::new(backend), strategy)
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    pub fn lock_strategy(&self) -> &LockStrategy {
        self.lock.strategy()
    }

    /// Startup read. Never fails: an absent or unreadable document is logged and
    /// reported as an empty catalog.
    pub async fn startup_snapshot(&self) -> Catalog {
        match self.backend.load().await {
            Ok(None) => {
                warn!(
                    document = %self.describe(),
                    "catalog document not found, starting with an empty catalog"
                );
                Catalog::new()
            }
            Ok(Some(bytes)) => match Self::decode_document(&bytes) {
                Ok(catalog) => {
                    info!(document = %self.describe(), products = catalog.len(), "catalog loaded");
                    catalog
                }
                Err(e) => {
                    warn!(
                        document = %self.describe(),
                        "{}; substituting an empty catalog until it is repaired", e
                    );
                    Catalog::new()
                }
            },
            Err(e) => {
                warn!(
                    document = %self.describe(),
                    "catalog document unreadable ({}), substituting an empty catalog", e
                );
                Catalog::new()
            }
        }
    }

    /// Every product at rest, in stored order.
    pub async fn list(&self) -> Result<Catalog, StoreError> {
        self.read_catalog().await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Product, StoreError> {
        self.read_catalog()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))
    }

    /// Products whose category equals `label` or, for list categories, contains it.
    ///
    /// An empty result is not an error; callers decide how to present it.
    pub async fn get_by_category(&self, label: &str) -> Result<Vec<Product>, StoreError> {
        let matches: Vec<Product> = self
            .read_catalog()
            .await?
            .into_iter()
            .filter(|p| p.in_category(label))
            .collect();
        debug!(category = label, matches = matches.len(), "category lookup");
        Ok(matches)
    }

    /// Appends new products, assigning sequential ids after the current maximum.
    ///
    /// The whole batch is validated first; one bad element rejects all of it.
    pub async fn insert_many(&self, drafts: Vec<JsonValue>) -> Result<Vec<Product>, StoreError> {
        if drafts.is_empty() {
            return Err(StoreError::Validation("no products supplied".to_string()));
        }
        let mut validated = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            let fields = validate_draft(draft)
                .map_err(|e| StoreError::Validation(format!("product {}: {}", index, e)))?;
            validated.push(fields);
        }

        let _guard = self.lock.acquire().await?;
        let mut catalog = self.read_catalog().await?;
        let mut next = next_id(&catalog);
        let mut inserted = Vec::with_capacity(validated.len());
        for (index, fields) in validated.into_iter().enumerate() {
            let id = next.ok_or(StoreError::IdsExhausted(u64::MAX))?;
            let product = Product::from_draft(id, fields)
                .map_err(|e| StoreError::Validation(format!("product {}: {}", index, e)))?;
            inserted.push(product);
            next = id.checked_add(1);
        }
        catalog.extend(inserted.iter().cloned());
        self.write_catalog(&catalog).await?;

        info!(
            count = inserted.len(),
            first_id = inserted.first().map(|p| p.id),
            "products inserted"
        );
        Ok(inserted)
    }

    /// Merges `patch` onto the product with `id` and returns the result.
    pub async fn update(&self, id: u64, patch: &JsonValue) -> Result<Product, StoreError> {
        let patch = patch
            .as_object()
            .ok_or_else(|| StoreError::Validation("update must be a JSON object".to_string()))?;

        let _guard = self.lock.acquire().await?;
        let mut catalog = self.read_catalog().await?;
        let slot = catalog
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        let merged = slot.merged(patch).map_err(StoreError::Validation)?;
        *slot = merged.clone();
        self.write_catalog(&catalog).await?;

        info!(id, "product updated");
        Ok(merged)
    }

    /// Removes the product with `id` and returns it.
    ///
    /// When nothing matches the document is not rewritten.
    pub async fn delete(&self, id: u64) -> Result<Product, StoreError> {
        let _guard = self.lock.acquire().await?;
        let mut catalog = self.read_catalog().await?;
        let index = catalog
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        let removed = catalog.remove(index);
        self.write_catalog(&catalog).await?;

        info!(id, "product deleted");
        Ok(removed)
    }

    async fn read_catalog(&self) -> Result<Catalog, StoreError> {
        match self.backend.load().await? {
            Some(bytes) => Self::decode_document(&bytes),
            None => Ok(Catalog::new()),
        }
    }

    async fn write_catalog(&self, catalog: &Catalog) -> Result<(), StoreError> {
        let bytes = codec::encode(catalog)?;
        self.backend.replace(&bytes).await.map_err(|e| {
            error!(document = %self.describe(), "catalog write failed: {}", e);
            StoreError::Io(e)
        })
    }

    /// A zero-length document is what a non-atomic writer leaves behind; read it as empty.
    fn decode_document(bytes: &[u8]) -> Result<Catalog, StoreError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Catalog::new());
        }
        codec::decode(bytes)
    }
}
