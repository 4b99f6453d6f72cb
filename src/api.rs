//! HTTP gateway turning chat-transport calls into session events

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::documents::DocumentStore;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(store)),
        }
    }
}
