//! Property-based tests for the state machine
//!
//! These drive the pure transition function with a model of the session's
//! documents (their page counts) and check that the invariants hold for
//! every event sequence.

use super::effect::Effect;
use super::event::{Action, Event, Upload};
use super::state::SessionState;
use super::transition::*;
use crate::menu::available_actions;
use proptest::prelude::*;

/// Pages every modelled upload contributes
const UPLOAD_PAGES: u32 = 3;

// ============================================================================
// Model
// ============================================================================

/// Apply effects to a page-count model of the session's documents, the way
/// the runtime applies them to real handles.
fn apply_effects(documents: &mut Vec<u32>, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::StoreDocument { .. } => documents.push(UPLOAD_PAGES),
            Effect::RemovePage { index, .. } => documents[*index] -= 1,
            Effect::MergeAll => {
                let total = documents.iter().sum();
                *documents = vec![total];
            }
            Effect::ReleaseAll => documents.clear(),
            Effect::Deliver { .. } | Effect::Reply(_) => {}
        }
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Add),
        Just(Action::RemovePage),
        Just(Action::Merge),
        Just(Action::Reset),
        Just(Action::Finish),
    ]
}

fn arb_upload_event() -> impl Strategy<Value = Event> {
    Just(Event::DocumentUploaded {
        upload: Upload {
            content: b"%PDF-1.5".to_vec(),
            mime_type: Some("application/pdf".to_string()),
            file_name: None,
        },
    })
}

fn arb_text_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (0u32..6).prop_map(|n| n.to_string()),
        "[a-z ]{0,6}",
        "-?[0-9]{1,3}",
    ]
    .prop_map(|text| Event::TextSubmitted { text })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => Just(Event::Start),
        4 => arb_upload_event(),
        6 => arb_action().prop_map(|action| Event::ActionSelected { action }),
        4 => arb_text_event(),
        1 => Just(Event::Cancel),
    ]
}

fn arb_open_state() -> impl Strategy<Value = (SessionState, Vec<u32>)> {
    prop_oneof![
        proptest::collection::vec(0u32..6, 0..4)
            .prop_map(|docs| (SessionState::AwaitingDocument, docs)),
        proptest::collection::vec(0u32..6, 1..4).prop_map(|docs| (SessionState::HasDocuments, docs)),
        proptest::collection::vec(0u32..6, 1..4).prop_map(|docs| {
            let target = docs.len() - 1;
            (SessionState::AwaitingPageNumber { target }, docs)
        }),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_valid(state: &SessionState, documents: &[u32]) -> bool {
    if state.requires_documents() && documents.is_empty() {
        return false;
    }
    if let SessionState::AwaitingPageNumber { target } = state {
        return *target < documents.len() && *target == documents.len() - 1;
    }
    !state.is_terminal() || documents.is_empty()
}

fn fallible_effects_come_first(effects: &[Effect]) -> bool {
    let first_infallible_destructive = effects
        .iter()
        .position(|e| matches!(e, Effect::ReleaseAll));
    match first_infallible_destructive {
        Some(release_at) => effects[release_at..].iter().all(|e| !e.is_fallible()),
        None => true,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: documents are non-empty whenever the state needs them,
    // and the page-removal target is always the last document
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = SessionState::AwaitingDocument;
        let mut documents: Vec<u32> = Vec::new();

        for event in events {
            if state.is_terminal() {
                // The runtime discards closed sessions; only /start revives one
                state = SessionState::AwaitingDocument;
                documents.clear();
            }
            if let Ok(result) = transition(&state, &documents, event) {
                apply_effects(&mut documents, &result.effects);
                state = result.new_state;
                prop_assert!(is_valid(&state, &documents), "Invalid: {:?} with {:?}", state, documents);
            }
        }
    }

    // Invariant 2: effects never release documents before a fallible step
    #[test]
    fn prop_release_after_fallible_effects(
        (state, documents) in arb_open_state(),
        event in arb_event()
    ) {
        if let Ok(result) = transition(&state, &documents, event) {
            prop_assert!(
                fallible_effects_come_first(&result.effects),
                "Effects out of order: {:?}",
                result.effects
            );
        }
    }

    // Invariant 3: every offered menu action is accepted
    #[test]
    fn prop_menu_actions_are_accepted(documents in proptest::collection::vec(0u32..6, 1..5)) {
        let state = SessionState::HasDocuments;
        for item in available_actions(&state, documents.len()) {
            let result = transition(&state, &documents, Event::ActionSelected { action: item.action });
            prop_assert!(result.is_ok(), "Offered {:?} but it was rejected: {:?}", item.action, result);
        }
    }

    // Invariant 4: cancel from any open state closes and releases everything
    #[test]
    fn prop_cancel_releases_all((state, documents) in arb_open_state()) {
        let result = transition(&state, &documents, Event::Cancel).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Closed);
        let mut model = documents.clone();
        apply_effects(&mut model, &result.effects);
        prop_assert!(model.is_empty());
    }

    // Invariant 5: any in-range page number is accepted, anything else rejected
    #[test]
    fn prop_page_number_bounds(pages in 1u32..20, requested in 0u32..25) {
        let state = SessionState::AwaitingPageNumber { target: 0 };
        let result = transition(&state, &[pages], Event::TextSubmitted { text: requested.to_string() });
        if (1..=pages).contains(&requested) {
            let result = result.unwrap();
            prop_assert_eq!(result.new_state, SessionState::HasDocuments);
            let mut model = vec![pages];
            apply_effects(&mut model, &result.effects);
            prop_assert_eq!(model, vec![pages - 1]);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                TransitionError::OutOfRange { page: u64::from(requested), page_count: pages }
            );
        }
    }

    // Invariant 6: non-numeric text never leaves the page-number state
    #[test]
    fn prop_non_numeric_rejected(text in "[a-zA-Z .,-]{0,8}", pages in 1u32..10) {
        let state = SessionState::AwaitingPageNumber { target: 0 };
        let result = transition(&state, &[pages], Event::TextSubmitted { text });
        prop_assert!(matches!(result, Err(TransitionError::InvalidInput(_))));
    }
}
