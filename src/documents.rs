//! Per-session document storage
//!
//! `DocumentStore` owns the backing directory; `Documents` is one session's
//! ordered list of handles. Upload order is meaningful: the last entry is
//! the target of page removal, and merge concatenates in list order.

mod handle;
mod store;

pub use handle::DocumentHandle;
pub use store::{DocumentStore, StoreError};

/// Ordered handles owned by one session
#[derive(Debug, Default)]
pub struct Documents {
    handles: Vec<DocumentHandle>,
}

impl Documents {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DocumentHandle> {
        self.handles.get(index)
    }

    pub fn as_slice(&self) -> &[DocumentHandle] {
        &self.handles
    }

    /// Cached page counts in list order
    pub fn page_counts(&self) -> Vec<u32> {
        self.handles.iter().map(DocumentHandle::page_count).collect()
    }

    pub fn add(&mut self, handle: DocumentHandle) {
        self.handles.push(handle);
    }

    /// Put `handle` at `index` and release the handle it supersedes.
    ///
    /// `handle` must already be durably stored. On a bad index the new handle
    /// is released instead and the list is left untouched.
    pub fn replace(&mut self, index: usize, handle: DocumentHandle) -> Result<(), StoreError> {
        let slot = self
            .handles
            .get_mut(index)
            .ok_or(StoreError::MissingDocument(index))?;
        let old = std::mem::replace(slot, handle);
        tracing::debug!(
            user_id = %old.user_id(),
            old_handle = %old.id(),
            new_handle = %self.handles[index].id(),
            index,
            "Replaced document"
        );
        Ok(())
    }

    /// Collapse the whole list into `handle`, releasing every previous entry
    pub fn replace_all(&mut self, handle: DocumentHandle) -> usize {
        let old = std::mem::replace(&mut self.handles, vec![handle]);
        old.len()
    }

    /// Release every handle; returns how many were released
    pub fn remove_all(&mut self) -> usize {
        let released = self.handles.len();
        self.handles.clear();
        released
    }
}
