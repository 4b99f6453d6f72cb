//! pdfdesk - chat-driven PDF editing sessions
//!
//! Each user walks through a small state machine: upload PDFs, remove pages,
//! merge, and receive the result. Documents live in temporary files owned by
//! the session and are released when the session no longer needs them.

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod menu;
pub mod pdf;
pub mod runtime;
pub mod state_machine;
