//! Effects produced by state transitions

use super::event::Upload;
use crate::error::ErrorKind;
use crate::menu::MenuItem;

/// Effects to be executed after a transition, in order.
///
/// The runtime commits the new state only if every effect succeeds, so
/// fallible effects are always listed before destructive ones.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Validate and append an upload
    StoreDocument { upload: Upload },

    /// Replace the document at `index` with a copy lacking `page`
    RemovePage { index: usize, page: u32 },

    /// Collapse all documents into their concatenation
    MergeAll,

    /// Send the document at `index` to the user
    Deliver { index: usize },

    /// Release every document the session holds
    ReleaseAll,

    /// Send a response to the user
    Reply(Response),
}

/// Outbound response descriptors rendered by the transport
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Prompt {
        text: String,
    },
    MenuPrompt {
        text: String,
        actions: Vec<MenuItem>,
    },
    DocumentDelivered {
        file_name: String,
        page_count: u32,
        content: Vec<u8>,
    },
    ErrorMessage {
        text: String,
        kind: ErrorKind,
    },
}

impl Response {
    pub fn prompt(text: impl Into<String>) -> Self {
        Response::Prompt { text: text.into() }
    }

    pub fn error(err: &crate::error::SessionError) -> Self {
        Response::ErrorMessage {
            text: err.to_string(),
            kind: err.kind(),
        }
    }
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Response::prompt(text))
    }

    /// Show the menu for a session that will hold `document_count` documents
    pub fn show_menu(document_count: usize) -> Self {
        Effect::Reply(crate::menu::menu_prompt(document_count))
    }

    /// Effects that can fail and abort the transition
    pub fn is_fallible(&self) -> bool {
        matches!(
            self,
            Effect::StoreDocument { .. }
                | Effect::RemovePage { .. }
                | Effect::MergeAll
                | Effect::Deliver { .. }
        )
    }
}
