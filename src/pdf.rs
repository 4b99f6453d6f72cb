//! PDF operation executor
//!
//! Validates inputs, runs the `lopdf` primitives on the blocking pool, and
//! materializes every result as a new stored `DocumentHandle`. Inputs are
//! never modified; callers decide when superseded handles are released.

mod error;
#[cfg(test)]
pub(crate) mod fixtures;
mod primitives;

pub use error::PdfError;

use crate::documents::{DocumentHandle, DocumentStore};
use crate::state_machine::Upload;
use std::sync::Arc;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Structural check used before accepting an upload.
///
/// Content without a PDF header is the wrong kind of file. Content with a
/// header that later fails to parse is a corrupt PDF.
pub fn validate_is_pdf(content: &[u8]) -> bool {
    primitives::has_pdf_header(content)
}

#[derive(Debug, Clone)]
pub struct PdfExecutor {
    store: Arc<DocumentStore>,
}

impl PdfExecutor {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Validate an upload and store it as a new handle owned by `user_id`
    pub async fn ingest(&self, user_id: &str, upload: Upload) -> Result<DocumentHandle, PdfError> {
        if let Some(mime) = upload.mime_type.as_deref() {
            if !mime.eq_ignore_ascii_case(PDF_MIME_TYPE) {
                return Err(PdfError::NotPdf(
                    "Please send a valid PDF document.".to_string(),
                ));
            }
        }

        let Upload {
            content, file_name, ..
        } = upload;
        if !validate_is_pdf(&content) {
            return Err(PdfError::NotPdf(
                "Please send a valid PDF document.".to_string(),
            ));
        }

        let (content, page_count) = run_blocking(move || {
            let page_count = primitives::page_count(&content)?;
            Ok((content, page_count))
        })
        .await?;
        if page_count == 0 {
            return Err(PdfError::Malformed("document has no pages".to_string()));
        }

        let handle = self.store.create(user_id, content, page_count).await?;
        tracing::info!(
            user_id = %user_id,
            handle_id = %handle.id(),
            file_name = file_name.as_deref().unwrap_or("<unnamed>"),
            page_count,
            "Accepted uploaded document"
        );
        Ok(handle)
    }

    /// Re-read the stored content and count its pages
    pub async fn page_count(&self, handle: &DocumentHandle) -> Result<u32, PdfError> {
        let content = self.store.read(handle).await?;
        run_blocking(move || primitives::page_count(&content)).await
    }

    /// New handle holding `handle` minus `page` (1-indexed)
    pub async fn remove_page(
        &self,
        handle: &DocumentHandle,
        page: u32,
    ) -> Result<DocumentHandle, PdfError> {
        let page_count = handle.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::OutOfRange { page, page_count });
        }

        let content = self.store.read(handle).await?;
        let assembled = run_blocking(move || primitives::remove_page(&content, page)).await?;
        let result = self
            .store
            .create(handle.user_id(), assembled.bytes, assembled.page_count)
            .await?;

        tracing::info!(
            user_id = %handle.user_id(),
            source = %handle.id(),
            result = %result.id(),
            page,
            page_count = result.page_count(),
            "Removed page"
        );
        Ok(result)
    }

    /// New handle concatenating `handles` in order
    pub async fn merge(&self, handles: &[DocumentHandle]) -> Result<DocumentHandle, PdfError> {
        let Some(first) = handles.first() else {
            return Err(PdfError::TooFewDocuments { count: 0 });
        };
        if handles.len() < 2 {
            return Err(PdfError::TooFewDocuments {
                count: handles.len(),
            });
        }

        let mut sources = Vec::with_capacity(handles.len());
        for handle in handles {
            sources.push(self.store.read(handle).await?);
        }
        let assembled = run_blocking(move || primitives::merge(&sources)).await?;
        let result = self
            .store
            .create(first.user_id(), assembled.bytes, assembled.page_count)
            .await?;

        tracing::info!(
            user_id = %first.user_id(),
            inputs = handles.len(),
            result = %result.id(),
            page_count = result.page_count(),
            "Merged documents"
        );
        Ok(result)
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PdfError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PdfError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PdfError::Worker(e.to_string()))?
}
