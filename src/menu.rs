//! Menu presenter
//!
//! Pure mapping from session state and document count to the actions a
//! user is offered. Nothing here is stored; the menu is recomputed for
//! every response.

use crate::state_machine::{Action, Response, SessionState};
use serde::Serialize;

pub const MENU_TEXT: &str = "Choose an option:";

/// One selectable button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub action: Action,
    pub label: &'static str,
}

impl MenuItem {
    fn new(action: Action, label: &'static str) -> Self {
        Self { action, label }
    }
}

/// Actions offered while documents are loaded.
///
/// A single document can be edited or retrieved; several documents can be
/// trimmed (last one only), merged or discarded.
pub fn menu_for(document_count: usize) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::new(Action::Add, "Add another PDF")];
    if document_count == 1 {
        items.push(MenuItem::new(Action::RemovePage, "Remove a page"));
        items.push(MenuItem::new(Action::Finish, "Finish & get PDF"));
    } else {
        items.push(MenuItem::new(Action::RemovePage, "Remove page (last PDF)"));
        items.push(MenuItem::new(Action::Merge, "Merge all PDFs"));
        items.push(MenuItem::new(Action::Reset, "Reset"));
    }
    items
}

/// Actions available in `state`; empty outside the menu state
pub fn available_actions(state: &SessionState, document_count: usize) -> Vec<MenuItem> {
    match state {
        SessionState::HasDocuments if document_count > 0 => menu_for(document_count),
        _ => Vec::new(),
    }
}

pub fn menu_prompt(document_count: usize) -> Response {
    Response::MenuPrompt {
        text: MENU_TEXT.to_string(),
        actions: menu_for(document_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(items: &[MenuItem]) -> Vec<Action> {
        items.iter().map(|item| item.action).collect()
    }

    #[test]
    fn test_single_document_menu() {
        assert_eq!(
            actions(&menu_for(1)),
            vec![Action::Add, Action::RemovePage, Action::Finish]
        );
    }

    #[test]
    fn test_multi_document_menu() {
        let items = menu_for(3);
        assert_eq!(
            actions(&items),
            vec![Action::Add, Action::RemovePage, Action::Merge, Action::Reset]
        );
        assert_eq!(items[1].label, "Remove page (last PDF)");
    }

    #[test]
    fn test_no_actions_outside_menu_state() {
        assert!(available_actions(&SessionState::AwaitingDocument, 2).is_empty());
        assert!(available_actions(&SessionState::AwaitingPageNumber { target: 0 }, 1).is_empty());
        assert!(available_actions(&SessionState::Closed, 0).is_empty());
        assert_eq!(available_actions(&SessionState::HasDocuments, 1).len(), 3);
    }
}
