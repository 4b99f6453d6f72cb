//! Runtime for user sessions
//!
//! Sessions are keyed by user id. Each lives behind its own async mutex,
//! held for the whole of an event, so one user's events are applied strictly
//! one at a time while different users proceed in parallel.

mod session;

pub use session::{Session, RESULT_FILE_NAME};

use crate::documents::DocumentStore;
use crate::menu::{available_actions, MenuItem};
use crate::pdf::PdfExecutor;
use crate::state_machine::{Event, Response, SessionState, NO_SESSION_TEXT};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub page_counts: Vec<u32>,
    pub actions: Vec<MenuItem>,
}

/// Manager for all user sessions
pub struct SessionManager {
    executor: PdfExecutor,
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            executor: PdfExecutor::new(store),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        self.executor.store()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Apply `event` to `user_id`'s session and return what to send back
    pub async fn dispatch(&self, user_id: &str, event: Event) -> Vec<Response> {
        let is_start = matches!(event, Event::Start);

        loop {
            let session = if is_start {
                self.get_or_create(user_id).await
            } else if let Some(session) = self.get(user_id).await {
                session
            } else {
                tracing::debug!(user_id = %user_id, event = event.name(), "No session for event");
                return vec![Response::prompt(NO_SESSION_TEXT)];
            };

            let mut guard = session.lock().await;
            if guard.state().is_terminal() {
                // Closed by the event we queued behind; it has already left the map
                if is_start {
                    continue;
                }
                return vec![Response::prompt(NO_SESSION_TEXT)];
            }

            let responses = guard.handle(event, &self.executor).await;

            if guard.state().is_terminal() {
                // Still holding the session lock, so nobody can revive it meanwhile
                let mut sessions = self.sessions.write().await;
                if sessions
                    .get(user_id)
                    .is_some_and(|current| Arc::ptr_eq(current, &session))
                {
                    sessions.remove(user_id);
                }
                tracing::info!(user_id = %user_id, "Session closed");
            }

            return responses;
        }
    }

    /// Current state, documents and menu, if the user has a session
    pub async fn snapshot(&self, user_id: &str) -> Option<SessionSnapshot> {
        let session = self.get(user_id).await?;
        let guard = session.lock().await;
        if guard.state().is_terminal() {
            return None;
        }
        let state = guard.state();
        let page_counts = guard.documents().page_counts();
        Some(SessionSnapshot {
            actions: available_actions(&state, page_counts.len()),
            state,
            page_counts,
        })
    }

    async fn get(&self, user_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(user_id).cloned()
    }

    async fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(user_id) {
            return Arc::clone(session);
        }
        tracing::info!(user_id = %user_id, "Session created");
        let session = Arc::new(Mutex::new(Session::new(user_id)));
        sessions.insert(user_id.to_string(), Arc::clone(&session));
        session
    }
}
