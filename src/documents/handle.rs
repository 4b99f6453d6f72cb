//! Ownership-tracked document handles
//!
//! A `DocumentHandle` is the only owner of its backing file. Dropping the
//! handle releases the file, so a handle can be released at most once and
//! a handle that goes out of scope can never leak its storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Per-user bookkeeping shared by the store and every handle it creates
#[derive(Debug, Default)]
pub(crate) struct HandleRegistry {
    users: Mutex<HashMap<String, UserHandles>>,
}

#[derive(Debug, Default)]
struct UserHandles {
    open: usize,
    next_sequence: u64,
}

impl HandleRegistry {
    /// Count a new handle for `user_id` and return its sequence number.
    ///
    /// The caller must either wrap the file in a `DocumentHandle` or call
    /// `released` if creating it fails.
    pub(crate) fn reserve(&self, user_id: &str) -> u64 {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = users.entry(user_id.to_string()).or_default();
        let sequence = entry.next_sequence;
        entry.next_sequence += 1;
        entry.open += 1;
        sequence
    }

    /// Forget one handle; users with nothing open are dropped entirely
    pub(crate) fn released(&self, user_id: &str) {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = users.get_mut(user_id) {
            entry.open = entry.open.saturating_sub(1);
            if entry.open == 0 {
                users.remove(user_id);
            }
        }
    }

    pub(crate) fn open_handles(&self, user_id: &str) -> usize {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users.get(user_id).map_or(0, |entry| entry.open)
    }

    #[cfg(test)]
    pub(crate) fn tracked_users(&self) -> usize {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Reference to one stored PDF plus its cached page count
#[derive(Debug)]
pub struct DocumentHandle {
    id: Uuid,
    user_id: String,
    sequence: u64,
    page_count: u32,
    path: PathBuf,
    /// `None` once released
    file: Option<NamedTempFile>,
    registry: Arc<HandleRegistry>,
}

impl DocumentHandle {
    pub(crate) fn new(
        user_id: &str,
        sequence: u64,
        page_count: u32,
        file: NamedTempFile,
        registry: Arc<HandleRegistry>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            sequence,
            page_count,
            path: file.path().to_path_buf(),
            file: Some(file),
            registry,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        match file.close() {
            Ok(()) => tracing::debug!(
                user_id = %self.user_id,
                handle_id = %self.id,
                "Released document handle"
            ),
            // Storage cleanup is best-effort
            Err(e) => tracing::warn!(
                user_id = %self.user_id,
                handle_id = %self.id,
                path = %self.path.display(),
                error = %e,
                "Failed to remove backing file for released document"
            ),
        }
        self.registry.released(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_per_user() {
        let registry = HandleRegistry::default();
        assert_eq!(registry.reserve("alice"), 0);
        assert_eq!(registry.reserve("alice"), 1);
        assert_eq!(registry.reserve("bob"), 0);
        assert_eq!(registry.reserve("alice"), 2);
        assert_eq!(registry.open_handles("alice"), 3);
    }

    #[test]
    fn test_users_forgotten_once_nothing_is_open() {
        let registry = HandleRegistry::default();
        registry.reserve("alice");
        registry.reserve("alice");
        registry.reserve("bob");
        assert_eq!(registry.tracked_users(), 2);

        registry.released("alice");
        assert_eq!(registry.tracked_users(), 2);
        registry.released("alice");
        registry.released("bob");
        assert_eq!(registry.tracked_users(), 0);

        // Releasing an unknown user is a no-op
        registry.released("carol");
        assert_eq!(registry.open_handles("carol"), 0);
        assert_eq!(registry.tracked_users(), 0);
    }

    #[test]
    fn test_drop_removes_file_and_decrements_count() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(HandleRegistry::default());
        let file = NamedTempFile::new_in(dir.path()).unwrap();
        let path = file.path().to_path_buf();

        registry.reserve("alice");
        let handle = DocumentHandle::new("alice", 0, 1, file, Arc::clone(&registry));
        assert_eq!(registry.open_handles("alice"), 1);
        assert!(path.exists());

        drop(handle);
        assert_eq!(registry.open_handles("alice"), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_release_survives_missing_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(HandleRegistry::default());
        let file = NamedTempFile::new_in(dir.path()).unwrap();
        let path = file.path().to_path_buf();

        registry.reserve("alice");
        let handle = DocumentHandle::new("alice", 0, 1, file, Arc::clone(&registry));
        std::fs::remove_file(&path).unwrap();

        // Must not panic; the failure is only logged
        drop(handle);
        assert_eq!(registry.open_handles("alice"), 0);
    }
}
