//! Backing storage for document handles

use super::handle::{DocumentHandle, HandleRegistry};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage worker failed: {0}")]
    Worker(String),
    #[error("no document at position {0}")]
    MissingDocument(usize),
}

/// Writes document content into uniquely named files under one directory
#[derive(Debug)]
pub struct DocumentStore {
    dir: PathBuf,
    registry: Arc<HandleRegistry>,
    #[cfg(test)]
    fail_writes: std::sync::atomic::AtomicBool,
}

impl DocumentStore {
    /// Open (creating if needed) the storage directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            registry: Arc::new(HandleRegistry::default()),
            #[cfg(test)]
            fail_writes: std::sync::atomic::AtomicBool::new(false),
        })
    }

    /// Remove backing files left behind by a previous process.
    ///
    /// Sessions are not persisted, so nothing in the directory can be
    /// referenced at startup.
    pub fn purge_stale(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "pdf") {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to remove stale document"
                    ),
                }
            }
        }
        Ok(removed)
    }

    /// Durably write `content` and return the handle that owns it.
    ///
    /// The file is flushed and synced before the handle exists, so a caller
    /// that swaps this handle in for an older one never loses both.
    pub async fn create(
        &self,
        user_id: &str,
        content: Vec<u8>,
        page_count: u32,
    ) -> Result<DocumentHandle, StoreError> {
        #[cfg(test)]
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("injected write failure")));
        }

        let sequence = self.registry.reserve(user_id);
        let prefix = format!("{}_{sequence}_", file_stem(user_id));
        let dir = self.dir.clone();
        let size = content.len();

        let written = tokio::task::spawn_blocking(move || -> std::io::Result<_> {
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".pdf")
                .tempfile_in(&dir)?;
            file.write_all(&content)?;
            file.flush()?;
            file.as_file().sync_all()?;
            Ok(file)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))
        .and_then(|result| result.map_err(StoreError::from));

        let file = match written {
            Ok(file) => file,
            Err(e) => {
                self.registry.released(user_id);
                return Err(e);
            }
        };

        let handle = DocumentHandle::new(
            user_id,
            sequence,
            page_count,
            file,
            Arc::clone(&self.registry),
        );
        tracing::debug!(
            user_id = %user_id,
            handle_id = %handle.id(),
            sequence,
            page_count,
            bytes = size,
            "Stored document"
        );
        Ok(handle)
    }

    pub async fn read(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StoreError> {
        Ok(tokio::fs::read(handle.path()).await?)
    }

    /// Number of live handles owned by `user_id`
    pub fn open_handles(&self, user_id: &str) -> usize {
        self.registry.open_handles(user_id)
    }

    #[cfg(test)]
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

/// User ids come from the transport; keep file names to a safe alphabet
fn file_stem(user_id: &str) -> String {
    let stem: String = user_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    if stem.is_empty() {
        "user".to_string()
    } else {
        stem
    }
}
