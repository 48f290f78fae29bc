//! Stream relay
//!
//! One pump task per streaming request reads decoded upstream frames,
//! accumulates the transcript, and forwards each frame to the caller the
//! moment it arrives. The caller's channel is its own buffer: a caller that
//! stops reading never stalls the upstream read or the accumulation, and a
//! dropped caller is noticed before the next upstream read.
//!
//! The transcript is committed only after upstream ended normally, and the
//! caller's channel is closed only after that commit attempt returned.

use std::sync::Arc;
use std::time::Duration;

use compass_common::{Error, Result};
use compass_llm::{LlmError, StreamFrame};
use futures::{Stream, StreamExt};
use thiserror::Error as ThisError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::entities::Message;
use super::state::{StreamEvent, StreamState, StreamStateMachine};
use super::transcript::{Transcript, TranscriptAccumulator};

/// Persists the AI answer of a completed stream as its own unit of work.
///
/// Implementations must not depend on any transaction of the request that
/// opened the stream; by the time this runs that request may be long gone.
#[async_trait::async_trait]
pub trait TranscriptCommitter: Send + Sync {
    async fn commit(&self, conversation_id: Uuid, transcript: Transcript) -> Result<Message>;
}

/// What the caller receives, in order
#[derive(Debug)]
pub enum RelayEvent {
    /// An upstream frame, forwarded untouched
    Frame(StreamFrame),
    /// Terminal error; no further events follow
    Failed(Error),
}

/// Why a stream ended early
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum StreamFailure {
    #[error("upstream failed: {0}")]
    Upstream(LlmError),

    #[error("no upstream frame within {0:?}")]
    IdleTimeout(Duration),

    #[error("caller disconnected")]
    CallerDisconnected,
}

impl From<StreamFailure> for Error {
    fn from(failure: StreamFailure) -> Self {
        match failure {
            StreamFailure::Upstream(e) => e.into(),
            other => Error::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Final result of one relayed stream
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// The AI answer was stored
    Committed { message_id: Uuid },
    /// Upstream ended normally without answer text; nothing stored
    Empty,
    /// Upstream ended normally but storing the answer failed
    CommitFailed,
    /// Upstream did not end normally; nothing stored
    Aborted(StreamFailure),
}

/// Spawn the pump for `frames` and hand back the caller's end of the channel
pub fn spawn_relay<S>(
    frames: S,
    committer: Arc<dyn TranscriptCommitter>,
    conversation_id: Uuid,
    idle_timeout: Duration,
) -> (mpsc::UnboundedReceiver<RelayEvent>, JoinHandle<RelayOutcome>)
where
    S: Stream<Item = std::result::Result<StreamFrame, LlmError>> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_relay(
        frames,
        tx,
        committer,
        conversation_id,
        idle_timeout,
    ));
    (rx, handle)
}

/// Drive one stream to completion.
///
/// `tx` is dropped when this returns, which ends the caller's stream.
pub async fn run_relay<S>(
    frames: S,
    tx: mpsc::UnboundedSender<RelayEvent>,
    committer: Arc<dyn TranscriptCommitter>,
    conversation_id: Uuid,
    idle_timeout: Duration,
) -> RelayOutcome
where
    S: Stream<Item = std::result::Result<StreamFrame, LlmError>> + Send,
{
    let mut frames = Box::pin(frames);
    let mut state = advance(StreamState::Idle, StreamEvent::Open);
    let mut transcript = TranscriptAccumulator::new();

    let failure = loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => break Some(StreamFailure::CallerDisconnected),
            next = tokio::time::timeout(idle_timeout, frames.next()) => next,
        };

        match next {
            Err(_) => break Some(StreamFailure::IdleTimeout(idle_timeout)),
            Ok(None) => break None,
            Ok(Some(Err(e))) => break Some(StreamFailure::Upstream(e)),
            Ok(Some(Ok(frame))) => {
                tracing::trace!(%conversation_id, kind = %frame.kind(), "Relaying frame");
                transcript.observe(&frame);
                if tx.send(RelayEvent::Frame(frame)).is_err() {
                    break Some(StreamFailure::CallerDisconnected);
                }
            }
        }
    };

    // Release the upstream connection before any further work
    drop(frames);

    if let Some(failure) = failure {
        state = advance(state, StreamEvent::Fail);
        tracing::warn!(
            %conversation_id,
            %state,
            frames = transcript.frames_observed(),
            error = %failure,
            "Stream aborted; transcript discarded"
        );
        if failure != StreamFailure::CallerDisconnected {
            let _ = tx.send(RelayEvent::Failed(failure.clone().into()));
        }
        return RelayOutcome::Aborted(failure);
    }

    state = advance(state, StreamEvent::Finish);
    if state != StreamState::Succeeded {
        return RelayOutcome::Aborted(StreamFailure::Upstream(LlmError::Stream(format!(
            "stream ended in state {state}"
        ))));
    }

    let transcript = transcript.finish();
    if transcript.is_empty() {
        tracing::warn!(%conversation_id, "Stream completed without answer text; nothing stored");
        return RelayOutcome::Empty;
    }

    match committer.commit(conversation_id, transcript).await {
        Ok(message) => {
            tracing::info!(%conversation_id, message_id = %message.id, "AI answer stored");
            RelayOutcome::Committed {
                message_id: message.id,
            }
        }
        Err(e) => {
            tracing::error!(%conversation_id, error = %e, "Failed to store AI answer");
            RelayOutcome::CommitFailed
        }
    }
}

fn advance(current: StreamState, event: StreamEvent) -> StreamState {
    match StreamStateMachine::transition(current, event) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid stream transition");
            StreamState::Failed
        }
    }
}
