//! User-facing error taxonomy for session events
//!
//! Every failure that reaches a user is one of five kinds. Lower layers
//! (`StoreError`, `PdfError`, `TransitionError`) convert into `SessionError`
//! so the runtime only has to render one type.

use crate::documents::StoreError;
use crate::pdf::PdfError;
use crate::state_machine::TransitionError;
use serde::Serialize;
use thiserror::Error;

/// Error classification carried on `ErrorMessage` responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wrong kind of input for the current step, or a malformed number
    InvalidInputKind,
    /// Page number outside the target document
    OutOfRange,
    /// Action needs a document count the session does not have
    PreconditionNotMet,
    /// Content could not be parsed as a PDF
    CorruptDocument,
    /// Creating, reading or releasing backing storage failed
    StorageFailure,
}

/// A rejected event. The session is left exactly as it was before the event.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidInputKind(String),
    #[error("Number out of range. Enter 1-{page_count}.")]
    OutOfRange { page: u64, page_count: u32 },
    #[error("{0}")]
    PreconditionNotMet(String),
    #[error("That PDF could not be read ({0}). Please send another file.")]
    CorruptDocument(String),
    #[error("Something went wrong storing your PDF ({0}). Please try again.")]
    StorageFailure(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidInputKind(_) => ErrorKind::InvalidInputKind,
            SessionError::OutOfRange { .. } => ErrorKind::OutOfRange,
            SessionError::PreconditionNotMet(_) => ErrorKind::PreconditionNotMet,
            SessionError::CorruptDocument(_) => ErrorKind::CorruptDocument,
            SessionError::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }
}

impl From<TransitionError> for SessionError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::OutOfRange { page, page_count } => {
                SessionError::OutOfRange { page, page_count }
            }
            TransitionError::PreconditionNotMet(msg) => SessionError::PreconditionNotMet(msg),
            TransitionError::InvalidInput(_) | TransitionError::NotAccepted { .. } => {
                SessionError::InvalidInputKind(err.to_string())
            }
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::StorageFailure(err.to_string())
    }
}

impl From<PdfError> for SessionError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::NotPdf(msg) => SessionError::InvalidInputKind(msg),
            PdfError::OutOfRange { page, page_count } => SessionError::OutOfRange {
                page: u64::from(page),
                page_count,
            },
            PdfError::TooFewDocuments { count } => SessionError::PreconditionNotMet(format!(
                "Merging needs at least two PDFs, but only {count} uploaded."
            )),
            PdfError::Store(e) => SessionError::StorageFailure(e.to_string()),
            PdfError::Parse(_) | PdfError::Malformed(_) | PdfError::Worker(_) => {
                SessionError::CorruptDocument(err.to_string())
            }
            PdfError::Write(msg) => SessionError::StorageFailure(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_names_bounds() {
        let err = SessionError::OutOfRange {
            page: 9,
            page_count: 3,
        };
        assert_eq!(err.to_string(), "Number out of range. Enter 1-3.");
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_pdf_errors_map_to_taxonomy() {
        let kind = |e: PdfError| SessionError::from(e).kind();
        assert_eq!(
            kind(PdfError::NotPdf("nope".into())),
            ErrorKind::InvalidInputKind
        );
        assert_eq!(
            kind(PdfError::TooFewDocuments { count: 1 }),
            ErrorKind::PreconditionNotMet
        );
        assert_eq!(
            kind(PdfError::Malformed("no pages".into())),
            ErrorKind::CorruptDocument
        );
        assert_eq!(
            kind(PdfError::OutOfRange {
                page: 4,
                page_count: 3
            }),
            ErrorKind::OutOfRange
        );
    }

    #[test]
    fn test_not_accepted_is_invalid_input() {
        let err = SessionError::from(TransitionError::NotAccepted {
            hint: "Please send a valid PDF document.",
        });
        assert_eq!(err.kind(), ErrorKind::InvalidInputKind);
        assert_eq!(err.to_string(), "Please send a valid PDF document.");
    }
}
