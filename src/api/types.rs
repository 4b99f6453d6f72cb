//! API request and response types

use crate::error::ErrorKind;
use crate::menu::MenuItem;
use crate::runtime::SessionSnapshot;
use crate::state_machine::Response;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Request to submit free text (page numbers)
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Everything the session sent back for one event
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub responses: Vec<ResponseBody>,
}

impl DispatchResponse {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: responses.into_iter().map(ResponseBody::from).collect(),
        }
    }
}

/// Wire form of a session response
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
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
        content_base64: String,
    },
    ErrorMessage {
        text: String,
        kind: ErrorKind,
    },
}

impl From<Response> for ResponseBody {
    fn from(response: Response) -> Self {
        match response {
            Response::Prompt { text } => ResponseBody::Prompt { text },
            Response::MenuPrompt { text, actions } => ResponseBody::MenuPrompt { text, actions },
            Response::DocumentDelivered {
                file_name,
                page_count,
                content,
            } => ResponseBody::DocumentDelivered {
                file_name,
                page_count,
                content_base64: STANDARD.encode(content),
            },
            Response::ErrorMessage { text, kind } => ResponseBody::ErrorMessage { text, kind },
        }
    }
}

/// Read-only session view
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user_id: String,
    pub state: &'static str,
    pub page_counts: Vec<u32>,
    pub actions: Vec<MenuItem>,
}

impl SessionView {
    pub fn new(user_id: impl Into<String>, snapshot: SessionSnapshot) -> Self {
        Self {
            user_id: user_id.into(),
            state: snapshot.state.name(),
            page_counts: snapshot.page_counts,
            actions: snapshot.actions,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
