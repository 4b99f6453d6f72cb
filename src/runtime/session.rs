//! One user's session and the executor for its effects

use crate::documents::{Documents, StoreError};
use crate::error::SessionError;
use crate::pdf::PdfExecutor;
use crate::state_machine::{transition, Effect, Event, Response, SessionState};

/// Name given to delivered results
pub const RESULT_FILE_NAME: &str = "result.pdf";

/// A user's workflow state plus the documents it owns.
///
/// Dropping a session releases all of its documents.
#[derive(Debug)]
pub struct Session {
    user_id: String,
    state: SessionState,
    documents: Documents,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: SessionState::default(),
            documents: Documents::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    /// Apply one event.
    ///
    /// If the event is rejected, or any effect fails, the state is left as
    /// it was and the only response is an `ErrorMessage`.
    pub async fn handle(&mut self, event: Event, executor: &PdfExecutor) -> Vec<Response> {
        let event_name = event.name();
        let result = match transition(&self.state, &self.documents.page_counts(), event) {
            Ok(result) => result,
            Err(e) => {
                let err = SessionError::from(e);
                tracing::warn!(
                    user_id = %self.user_id,
                    state = self.state.name(),
                    event = event_name,
                    error = %err,
                    "Rejected event"
                );
                return vec![Response::error(&err)];
            }
        };

        tracing::debug!(
            user_id = %self.user_id,
            from = self.state.name(),
            to = result.new_state.name(),
            event = event_name,
            effects = result.effects.len(),
            "Transition"
        );

        let mut responses = Vec::new();
        for effect in result.effects {
            if let Err(err) = self.execute_effect(effect, executor, &mut responses).await {
                tracing::warn!(
                    user_id = %self.user_id,
                    state = self.state.name(),
                    event = event_name,
                    kind = ?err.kind(),
                    error = %err,
                    "Effect failed, session unchanged"
                );
                return vec![Response::error(&err)];
            }
        }

        self.state = result.new_state;
        debug_assert!(
            !self.state.requires_documents() || !self.documents.is_empty(),
            "{:?} with no documents",
            self.state
        );
        responses
    }

    async fn execute_effect(
        &mut self,
        effect: Effect,
        executor: &PdfExecutor,
        responses: &mut Vec<Response>,
    ) -> Result<(), SessionError> {
        match effect {
            Effect::StoreDocument { upload } => {
                let handle = executor.ingest(&self.user_id, upload).await?;
                self.documents.add(handle);
            }

            Effect::RemovePage { index, page } => {
                let source = self
                    .documents
                    .get(index)
                    .ok_or(StoreError::MissingDocument(index))?;
                let edited = executor.remove_page(source, page).await?;
                // The edited copy is stored; only now is the original released
                self.documents.replace(index, edited)?;
            }

            Effect::MergeAll => {
                let merged = executor.merge(self.documents.as_slice()).await?;
                let released = self.documents.replace_all(merged);
                tracing::debug!(user_id = %self.user_id, released, "Released merge inputs");
            }

            Effect::Deliver { index } => {
                let handle = self
                    .documents
                    .get(index)
                    .ok_or(StoreError::MissingDocument(index))?;
                let content = executor.store().read(handle).await?;
                tracing::info!(
                    user_id = %self.user_id,
                    handle_id = %handle.id(),
                    page_count = handle.page_count(),
                    bytes = content.len(),
                    "Delivering result"
                );
                responses.push(Response::DocumentDelivered {
                    file_name: RESULT_FILE_NAME.to_string(),
                    page_count: handle.page_count(),
                    content,
                });
            }

            Effect::ReleaseAll => {
                let released = self.documents.remove_all();
                if released > 0 {
                    tracing::info!(user_id = %self.user_id, released, "Released session documents");
                }
            }

            Effect::Reply(response) => responses.push(response),
        }
        Ok(())
    }
}
