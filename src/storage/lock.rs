//! Mutual exclusion around read-modify-write cycles.
//!
//! Within a process every mutating call takes an async mutex. With
//! `LockStrategy::Advisory` the call additionally holds an exclusive `flock`
//! on a lock file that every cooperating process opens, which closes the
//! cross-process lost-update window. Without it two servers writing at the
//! same instant can still overwrite each other.

use crate::storage::StoreError;
use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const ADVISORY_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStrategy {
    /// Serialize cycles inside this process only.
    ProcessLocal,
    /// Also hold an advisory lock on `path` for the length of each cycle.
    Advisory { path: PathBuf, timeout: Duration },
}

impl LockStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LockStrategy::ProcessLocal => "process",
            LockStrategy::Advisory { .. } => "advisory",
        }
    }
}

pub struct WriteLock {
    local: Mutex<()>,
    strategy: LockStrategy,
}

impl WriteLock {
    pub fn new(strategy: LockStrategy) -> Self {
        Self {
            local: Mutex::new(()),
            strategy,
        }
    }

    pub fn strategy(&self) -> &LockStrategy {
        &self.strategy
    }

    /// Waits for exclusive access to the document.
    ///
    /// The advisory lock is polled, so a stuck peer turns into an I/O error
    /// after the configured timeout instead of a hung request.
    pub async fn acquire(&self) -> Result<CycleGuard<'_>, StoreError> {
        let local = self.local.lock().await;
        let file = match &self.strategy {
            LockStrategy::ProcessLocal => None,
            LockStrategy::Advisory { path, timeout } => {
                Some(acquire_advisory(path, *timeout).await?)
            }
        };
        Ok(CycleGuard {
            file,
            _local: local,
        })
    }
}

/// Held for the duration of one read-modify-write cycle.
pub struct CycleGuard<'a> {
    file: Option<File>,
    _local: MutexGuard<'a, ()>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            if let Err(e) = FileExt::unlock(file) {
                debug!("advisory unlock failed (released on close): {}", e);
            }
        }
    }
}

async fn acquire_advisory(path: &Path, timeout: Duration) -> io::Result<File> {
    let file = tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .await?
        .into_std()
        .await;

    let deadline = Instant::now() + timeout;
    let contended = fs2::lock_contended_error().raw_os_error();
    let mut waited = false;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(e) if e.raw_os_error() == contended => {
                if Instant::now() >= deadline {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!(
                            "timed out after {:?} waiting for lock {}",
                            timeout,
                            path.display()
                        ),
                    ));
                }
                if !waited {
                    warn!(lock = %path.display(), "catalog lock held by another writer, waiting");
                    waited = true;
                }
                tokio::time::sleep(ADVISORY_POLL).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::tempdir;

    #[tokio::test]
    async fn advisory_lock_times_out_while_held_elsewhere() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.json.lock");

        // A second handle stands in for another process holding the lock.
        let other = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .unwrap();
        other.lock_exclusive().unwrap();

        let lock = WriteLock::new(LockStrategy::Advisory {
            path: path.clone(),
            timeout: Duration::from_millis(50),
        });
        match lock.acquire().await {
            Err(StoreError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("lock should be contended"),
        }

        FileExt::unlock(&other).unwrap();
        assert!(lock.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn guard_release_lets_next_cycle_in() {
        let dir = tempdir().unwrap();
        let lock = WriteLock::new(LockStrategy::Advisory {
            path: dir.path().join("doc.lock"),
            timeout: Duration::from_millis(200),
        });
        drop(lock.acquire().await.unwrap());
        drop(lock.acquire().await.unwrap());
    }
}
