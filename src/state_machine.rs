//! Session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` decides, the runtime executes the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Response};
pub use event::{Action, Event, UnknownAction, Upload};
pub use state::SessionState;
pub use transition::{transition, TransitionError, TransitionResult, NO_SESSION_TEXT};
