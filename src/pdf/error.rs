//! PDF operation errors

use crate::documents::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    /// Upload is not a PDF at all (wrong MIME type, missing header)
    #[error("{0}")]
    NotPdf(String),
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
    /// Parsed, but not usable as a document (no pages, broken page tree)
    #[error("malformed PDF: {0}")]
    Malformed(String),
    #[error("page {page} is outside 1-{page_count}")]
    OutOfRange { page: u32, page_count: u32 },
    #[error("merge needs at least two documents, got {count}")]
    TooFewDocuments { count: usize },
    #[error("failed to write PDF: {0}")]
    Write(String),
    #[error("PDF worker failed: {0}")]
    Worker(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
