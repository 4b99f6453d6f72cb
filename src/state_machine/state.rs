//! Session state types

use serde::Serialize;

/// Where a session is in the upload/edit/retrieve workflow
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for an upload: the first one, or the next one after `add`
    #[default]
    AwaitingDocument,

    /// At least one document stored, menu showing
    HasDocuments,

    /// Waiting for the number of the page to remove
    AwaitingPageNumber {
        /// Index into the session's documents (always the last one)
        target: usize,
    },

    /// Cancelled or finished; the session is discarded
    Closed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    /// States in which the session must hold at least one document
    pub fn requires_documents(&self) -> bool {
        matches!(
            self,
            SessionState::HasDocuments | SessionState::AwaitingPageNumber { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingDocument => "awaiting_document",
            SessionState::HasDocuments => "has_documents",
            SessionState::AwaitingPageNumber { .. } => "awaiting_page_number",
            SessionState::Closed => "closed",
        }
    }
}
