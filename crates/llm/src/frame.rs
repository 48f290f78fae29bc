//! Event-stream frame decoding
//!
//! Upstream lines framed as `data: <payload>` are unwrapped; any other line
//! is passed through as its own payload. Each payload is classified by its
//! JSON `type` field. Unparseable payloads and unknown types become
//! [`StreamFrame::Other`] so the stream keeps flowing.

use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::LlmError;

const DATA_PREFIX: &str = "data: ";

/// Discriminator of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Content,
    Sources,
    Other,
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Content => write!(f, "content"),
            FrameKind::Sources => write!(f, "sources"),
            FrameKind::Other => write!(f, "other"),
        }
    }
}

/// One classified unit of the upstream stream.
///
/// Every variant keeps the unwrapped `payload` exactly as received so the
/// relay can forward it untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// Incremental answer text
    Content { fragment: String, payload: String },
    /// Citation metadata; `sources` is the text appended to the transcript
    Sources { sources: String, payload: String },
    /// Anything else: session markers, upstream errors, undecodable lines
    Other { payload: String },
}

impl StreamFrame {
    /// Decode one upstream line. Blank lines separate events and yield `None`.
    pub fn decode(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line).to_string();
        Some(Self::classify(payload))
    }

    fn classify(payload: String) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(&payload) else {
            return StreamFrame::Other { payload };
        };

        match value.get("type").and_then(Value::as_str) {
            Some("content") => match value.get("content").and_then(Value::as_str) {
                Some(fragment) => StreamFrame::Content {
                    fragment: fragment.to_string(),
                    payload,
                },
                None => StreamFrame::Other { payload },
            },
            Some("sources") => match value.get("sources") {
                Some(Value::Null) | None => StreamFrame::Other { payload },
                // Plain-string sources are kept as their text, structured ones serialized
                Some(Value::String(text)) => StreamFrame::Sources {
                    sources: text.clone(),
                    payload,
                },
                Some(structured) => StreamFrame::Sources {
                    sources: structured.to_string(),
                    payload,
                },
            },
            _ => StreamFrame::Other { payload },
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            StreamFrame::Content { .. } => FrameKind::Content,
            StreamFrame::Sources { .. } => FrameKind::Sources,
            StreamFrame::Other { .. } => FrameKind::Other,
        }
    }

    /// The unwrapped payload, as received
    pub fn payload(&self) -> &str {
        match self {
            StreamFrame::Content { payload, .. }
            | StreamFrame::Sources { payload, .. }
            | StreamFrame::Other { payload } => payload,
        }
    }
}

/// Lazily decode a line stream into classified frames, preserving order.
///
/// Transport errors are passed through; decoding itself never fails.
pub fn decode_frames<S>(lines: S) -> impl Stream<Item = Result<StreamFrame, LlmError>>
where
    S: Stream<Item = Result<String, LlmError>>,
{
    lines.filter_map(|line| async move {
        match line {
            Ok(line) => StreamFrame::decode(&line).map(Ok),
            Err(e) => Some(Err(e)),
        }
    })
}
