//! Pure state transition function
//!
//! Given the current state, the cached page counts of the session's
//! documents and an event, decide the next state and the effects that get
//! there. No I/O happens here; the runtime executes the effects.

use super::effect::{Effect, Response};
use super::event::{Action, Event};
use super::state::SessionState;
use thiserror::Error;

pub const WELCOME_TEXT: &str = "Welcome! Please send me a PDF to begin.";
pub const ADD_TEXT: &str = "Send another PDF:";
pub const PAGE_NUMBER_TEXT: &str = "Which page number to remove? (e.g., 1)";
pub const MERGED_TEXT: &str = "PDFs merged.";
pub const PAGE_REMOVED_TEXT: &str = "Page removed.";
pub const RESET_TEXT: &str = "Reset complete. Send a PDF to start.";
pub const CANCELLED_TEXT: &str = "Operation cancelled. Use /start to begin again.";
pub const FINISHED_TEXT: &str = "Here is your PDF. Use /start to run again.";
pub const NO_SESSION_TEXT: &str = "Use /start to begin.";

const SEND_PDF_HINT: &str = "Please send a valid PDF document.";
const CHOOSE_OPTION_HINT: &str = "Please choose one of the options.";
const ENTER_NUMBER_HINT: &str = "Enter a valid number.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Responses the transition itself produces (excludes delivered documents)
    pub fn replies(&self) -> impl Iterator<Item = &Response> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Reply(response) => Some(response),
            _ => None,
        })
    }
}

/// Why an event was rejected. The state is unchanged in every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Number out of range. Enter 1-{page_count}.")]
    OutOfRange { page: u64, page_count: u32 },
    #[error("{0}")]
    PreconditionNotMet(String),
    /// The event is not one this state listens for
    #[error("{hint}")]
    NotAccepted { hint: &'static str },
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    page_counts: &[u32],
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // /start always wins, discarding whatever the session held
        (_, Event::Start) => Ok(TransitionResult::new(SessionState::AwaitingDocument)
            .with_effect(Effect::ReleaseAll)
            .with_effect(Effect::reply(WELCOME_TEXT))),

        (SessionState::Closed, _) => Err(TransitionError::NotAccepted {
            hint: NO_SESSION_TEXT,
        }),

        (_, Event::Cancel) => Ok(TransitionResult::new(SessionState::Closed)
            .with_effect(Effect::ReleaseAll)
            .with_effect(Effect::reply(CANCELLED_TEXT))),

        (
            SessionState::AwaitingDocument | SessionState::HasDocuments,
            Event::DocumentUploaded { upload },
        ) => Ok(TransitionResult::new(SessionState::HasDocuments)
            .with_effect(Effect::StoreDocument { upload })
            .with_effect(Effect::show_menu(page_counts.len() + 1))),

        (SessionState::HasDocuments, Event::ActionSelected { action }) => {
            select_action(action, page_counts)
        }

        (SessionState::AwaitingPageNumber { target }, Event::TextSubmitted { text }) => {
            submit_page_number(*target, page_counts, &text)
        }

        (SessionState::AwaitingDocument, _) => {
            Err(TransitionError::NotAccepted { hint: SEND_PDF_HINT })
        }
        (SessionState::HasDocuments, _) => Err(TransitionError::NotAccepted {
            hint: CHOOSE_OPTION_HINT,
        }),
        (SessionState::AwaitingPageNumber { .. }, _) => Err(TransitionError::NotAccepted {
            hint: ENTER_NUMBER_HINT,
        }),
    }
}

fn select_action(
    action: Action,
    page_counts: &[u32],
) -> Result<TransitionResult, TransitionError> {
    let count = page_counts.len();
    match action {
        // Reuses the upload state; the documents stay
        Action::Add => {
            Ok(TransitionResult::new(SessionState::AwaitingDocument)
                .with_effect(Effect::reply(ADD_TEXT)))
        }

        Action::RemovePage => {
            // Always the most recently added document
            if count == 0 {
                return Err(TransitionError::PreconditionNotMet(
                    "Upload a PDF first.".to_string(),
                ));
            }
            Ok(
                TransitionResult::new(SessionState::AwaitingPageNumber { target: count - 1 })
                    .with_effect(Effect::reply(PAGE_NUMBER_TEXT)),
            )
        }

        Action::Merge if count < 2 => Err(TransitionError::PreconditionNotMet(
            "Merging needs at least two PDFs. Add another PDF first.".to_string(),
        )),
        Action::Merge => Ok(TransitionResult::new(SessionState::HasDocuments)
            .with_effect(Effect::MergeAll)
            .with_effect(Effect::reply(MERGED_TEXT))
            .with_effect(Effect::show_menu(1))),

        Action::Reset => Ok(TransitionResult::new(SessionState::AwaitingDocument)
            .with_effect(Effect::ReleaseAll)
            .with_effect(Effect::reply(RESET_TEXT))),

        Action::Finish if count != 1 => Err(TransitionError::PreconditionNotMet(
            "Finishing needs exactly one PDF. Merge or reset first.".to_string(),
        )),
        Action::Finish => Ok(TransitionResult::new(SessionState::Closed)
            .with_effect(Effect::Deliver { index: 0 })
            .with_effect(Effect::ReleaseAll)
            .with_effect(Effect::reply(FINISHED_TEXT))),
    }
}

fn submit_page_number(
    target: usize,
    page_counts: &[u32],
    text: &str,
) -> Result<TransitionResult, TransitionError> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransitionError::InvalidInput(ENTER_NUMBER_HINT.to_string()));
    }

    let Some(&page_count) = page_counts.get(target) else {
        return Err(TransitionError::PreconditionNotMet(
            "The document to edit is no longer available. Use /start to begin again."
                .to_string(),
        ));
    };

    // All digits, so the only parse failure is overflow, which is out of range anyway
    let requested = text.parse::<u64>().unwrap_or(u64::MAX);
    let page = u32::try_from(requested)
        .ok()
        .filter(|page| (1..=page_count).contains(page))
        .ok_or(TransitionError::OutOfRange {
            page: requested,
            page_count,
        })?;

    Ok(TransitionResult::new(SessionState::HasDocuments)
        .with_effect(Effect::RemovePage {
            index: target,
            page,
        })
        .with_effect(Effect::reply(PAGE_REMOVED_TEXT))
        .with_effect(Effect::show_menu(page_counts.len())))
}
