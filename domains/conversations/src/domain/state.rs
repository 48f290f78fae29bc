//! State machine for a relayed stream's lifecycle
//!
//! Idle → Streaming → Succeeded | Failed. Only a stream that reached
//! `Succeeded` may have its transcript committed.

pub use compass_common::StateError;
use serde::{Deserialize, Serialize};

/// Lifecycle states of one relayed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    /// Upstream not yet opened
    Idle,
    /// Frames are being relayed and accumulated
    Streaming,
    /// Upstream ended normally
    Succeeded,
    /// Upstream failed, timed out, or the caller went away
    Failed,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Streaming => write!(f, "streaming"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that drive stream state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamEvent {
    /// Upstream connection accepted
    Open,
    /// Upstream reached end of stream
    Finish,
    /// Any abnormal end
    Fail,
}

impl std::fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Finish => write!(f, "finish"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Stream lifecycle state machine
pub struct StreamStateMachine;

impl StreamStateMachine {
    /// Attempt a state transition
    pub fn transition(current: StreamState, event: StreamEvent) -> Result<StreamState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (StreamState::Idle, StreamEvent::Open) => Ok(StreamState::Streaming),
            (StreamState::Streaming, StreamEvent::Finish) => Ok(StreamState::Succeeded),
            (_, StreamEvent::Fail) => Ok(StreamState::Failed),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
