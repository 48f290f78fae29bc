//! Mock AI Service Implementation
//!
//! Used by `LlmServiceFactory` when provider is `"mock"`, and by tests to
//! script upstream streams: lines, mid-stream failures, stalls, and refused
//! connections. Records every request for test assertions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;

use crate::{ChatReply, ChatRequest, LineStream, LlmError, LlmService};

/// One scripted upstream event
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// A raw line, e.g. `data: {"type":"content","content":"hi"}`
    Line(String),
    /// Terminate the stream with a transport error
    Fail(String),
    /// Never produce another item
    Stall,
}

#[derive(Debug, Clone)]
enum Script {
    /// Default: echo the message back as content frames
    Echo,
    Events(Vec<MockEvent>),
    Refuse(String),
}

/// Sets the flag when the upstream stream is dropped
struct CloseGuard(Arc<AtomicBool>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Mock AI service for testing
#[derive(Debug, Clone)]
pub struct MockLlmService {
    script: Script,
    reply: Option<String>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    upstream_closed: Arc<AtomicBool>,
}

impl MockLlmService {
    /// Create a mock that echoes the user's message
    pub fn new() -> Self {
        Self {
            script: Script::Echo,
            reply: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            upstream_closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replay the given events on every stream
    pub fn with_events(mut self, events: Vec<MockEvent>) -> Self {
        self.script = Script::Events(events);
        self
    }

    /// Replay `data:`-framed content fragments followed by a blank separator each
    pub fn with_content(self, fragments: &[&str]) -> Self {
        let events = fragments
            .iter()
            .flat_map(|f| {
                let payload = serde_json::json!({"type": "content", "content": f});
                [
                    MockEvent::Line(format!("data: {}", payload)),
                    MockEvent::Line(String::new()),
                ]
            })
            .collect();
        self.with_events(events)
    }

    /// Refuse every connection, as an unreachable upstream would
    pub fn refusing(mut self, reason: &str) -> Self {
        self.script = Script::Refuse(reason.to_string());
        self
    }

    /// Fixed reply for `complete`; an empty string simulates a blank answer
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.to_string());
        self
    }

    /// Return all recorded requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether the most recently opened stream has been dropped
    pub fn upstream_closed(&self) -> bool {
        self.upstream_closed.load(Ordering::SeqCst)
    }

    fn record(&self, request: &ChatRequest) -> Result<(), LlmError> {
        self.requests
            .lock()
            .map_err(|e| LlmError::Request(format!("requests lock poisoned: {e}")))?
            .push(request.clone());
        Ok(())
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, LlmError> {
        tracing::info!("Mock AI service processing chat request");
        self.record(&request)?;

        if let Script::Refuse(reason) = &self.script {
            return Err(LlmError::Request(reason.clone()));
        }

        let response = self
            .reply
            .clone()
            .unwrap_or_else(|| format!("Mock response to: {}", request.message));

        if response.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(ChatReply {
            response: Some(response),
            session_id: Some(request.session_id),
            search_source: None,
        })
    }

    async fn stream(&self, request: ChatRequest) -> Result<LineStream, LlmError> {
        tracing::info!("Mock AI service opening chat stream");
        self.record(&request)?;

        let events = match &self.script {
            Script::Refuse(reason) => return Err(LlmError::Request(reason.clone())),
            Script::Echo => {
                let payload = serde_json::json!({
                    "type": "content",
                    "content": format!("Mock response to: {}", request.message),
                });
                vec![MockEvent::Line(format!("data: {}", payload))]
            }
            Script::Events(events) => events.clone(),
        };

        self.upstream_closed.store(false, Ordering::SeqCst);
        let guard = CloseGuard(self.upstream_closed.clone());

        let stream = async_stream::stream! {
            let _guard = guard;
            for event in events {
                match event {
                    MockEvent::Line(line) => yield Ok(line),
                    MockEvent::Fail(reason) => {
                        yield Err(LlmError::Stream(reason));
                        return;
                    }
                    MockEvent::Stall => std::future::pending::<()>().await,
                }
            }
        };

        Ok(stream.boxed())
    }
}
