//! Inbound events from the transport

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// `/start`: create or reset the session
    Start,
    DocumentUploaded { upload: Upload },
    ActionSelected { action: Action },
    TextSubmitted { text: String },
    /// `/cancel`
    Cancel,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::DocumentUploaded { .. } => "document_uploaded",
            Event::ActionSelected { .. } => "action_selected",
            Event::TextSubmitted { .. } => "text_submitted",
            Event::Cancel => "cancel",
        }
    }
}

/// Uploaded file as delivered by the transport
#[derive(Clone)]
pub struct Upload {
    pub content: Vec<u8>,
    /// MIME type declared by the sender, if any
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("bytes", &self.content.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Menu actions a user can pick while documents are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Add,
    RemovePage,
    Merge,
    Reset,
    Finish,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Add,
        Action::RemovePage,
        Action::Merge,
        Action::Reset,
        Action::Finish,
    ];

    /// Code used on the wire (button callback data)
    pub fn code(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::RemovePage => "remove_page",
            Action::Merge => "merge",
            Action::Reset => "reset",
            Action::Finish => "finish",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown action '{0}'. Please choose one of the options.")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(Action::Add),
            // Older clients send the short form
            "remove_page" | "remove" => Ok(Action::RemovePage),
            "merge" => Ok(Action::Merge),
            "reset" => Ok(Action::Reset),
            "finish" => Ok(Action::Finish),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
