//! Backing stores for the catalog document.
//!
//! The store never touches a path directly; it is handed a `CatalogBackend` at
//! construction. Servers use `FileBackend`, tests may use `MemoryBackend`.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Returns the raw document, or `None` when it does not exist yet.
    async fn load(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replaces the whole document. Concurrent readers see either the old or the
    /// new bytes, never a mix.
    async fn replace(&self, bytes: &[u8]) -> io::Result<()>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// A catalog document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling lock file shared by every process that writes this document.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Writes `bytes` to a fresh temp file next to the document and fsyncs it.
    ///
    /// The document itself is untouched until `StagedWrite::commit`.
    pub async fn stage(&self, bytes: &[u8]) -> io::Result<StagedWrite> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("catalog path {:?} has no file name", self.path),
                )
            })?
            .to_string_lossy()
            .into_owned();
        let tmp_name = format!(".{}.{:08x}.tmp", file_name, rand::random::<u32>());
        let tmp_path = match self.path.parent() {
            Some(parent) => parent.join(tmp_name),
            None => PathBuf::from(tmp_name),
        };

        let staged = StagedWrite {
            tmp_path,
            target: self.path.clone(),
            committed: false,
        };
        let mut file = tokio::fs::File::create(&staged.tmp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(staged)
    }
}

#[async_trait]
impl CatalogBackend for FileBackend {
    async fn load(&self) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn replace(&self, bytes: &[u8]) -> io::Result<()> {
        self.stage(bytes).await?.commit().await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fully written temp file waiting to be renamed over the document.
///
/// Dropping it without committing removes the temp file and leaves the
/// document as it was.
#[derive(Debug)]
pub struct StagedWrite {
    tmp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// Atomically swaps the temp file into place.
    pub async fn commit(mut self) -> io::Result<()> {
        tokio::fs::rename(&self.tmp_path, &self.target).await?;
        self.committed = true;
        sync_parent_dir(&self.target).await
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.tmp_path);
        }
    }
}

#[cfg_attr(not(unix), allow(unused_variables))]
async fn sync_parent_dir(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::File::open(parent).await?.sync_all().await?;
    }
    Ok(())
}

/// In-memory document, for tests and embedding.
#[derive(Default)]
pub struct MemoryBackend {
    document: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Mutex::new(Some(bytes.into())),
        }
    }

    /// Current document bytes.
    pub async fn snapshot(&self) -> Option<Vec<u8>> {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl CatalogBackend for MemoryBackend {
    async fn load(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.document.lock().await.clone())
    }

    async fn replace(&self, bytes: &[u8]) -> io::Result<()> {
        *self.document.lock().await = Some(bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_document_loads_as_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("products.json"));
        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_swaps_whole_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.json");
        let backend = FileBackend::new(&path);
        backend.replace(b"[1]").await.unwrap();
        backend.replace(b"[2]").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[2]");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn failure_before_rename_keeps_original_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.json");
        let original = b"[{\"id\": 1, \"title\": \"A\", \"price\": 1}]".to_vec();
        std::fs::write(&path, &original).unwrap();
        let backend = FileBackend::new(&path);

        // Temp file fully written, then the process "dies" before the rename.
        let staged = backend.stage(b"[{\"id\": 1, \"tit").await.unwrap();
        assert!(staged.temp_path().exists());
        assert_eq!(std::fs::read(&path).unwrap(), original);
        assert!(crate::storage::codec::decode(&std::fs::read(&path).unwrap()).is_ok());

        let tmp = staged.temp_path().to_path_buf();
        drop(staged);
        assert!(!tmp.exists());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("missing").join("products.json"));
        assert!(backend.replace(b"[]").await.is_err());
    }

    #[test]
    fn lock_path_is_a_sibling() {
        let backend = FileBackend::new("/srv/catalog/products.json");
        assert_eq!(
            backend.lock_path(),
            PathBuf::from("/srv/catalog/products.json.lock")
        );
    }
}
