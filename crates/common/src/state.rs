//! State machine error types
//!
//! Used by the stream lifecycle in the conversations domain.

use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot leave {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal state: {0} cannot transition")]
    TerminalState(String),
}
