//! HTTP AI Service Implementation
//!
//! Calls the AI service at `{base_url}/chat` (request/response) and
//! `{base_url}/chat-stream` (text/event-stream) using reqwest.

use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client, Response};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use crate::{ChatReply, ChatRequest, LineStream, LlmConfig, LlmError, LlmService};

/// Upper bound for a single upstream line
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// HTTP AI service client
pub struct HttpAiService {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpAiService {
    /// Create a new HTTP AI service client
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.request_timeout)
        } else {
            LlmError::Request(format!("HTTP request failed: {}", e))
        }
    }
}

/// Turn a non-2xx response into an error carrying the upstream body
async fn ensure_success(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    Err(LlmError::Response(format!(
        "AI service returned {}: {}",
        status, body
    )))
}

#[async_trait::async_trait]
impl LlmService for HttpAiService {
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, LlmError> {
        tracing::debug!(session_id = %request.session_id, "Sending AI chat request");

        let response = self
            .client
            .post(self.url("/chat"))
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let reply: ChatReply = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        match reply.response.as_deref() {
            Some(text) if !text.is_empty() => Ok(reply),
            _ => Err(LlmError::EmptyResponse),
        }
    }

    async fn stream(&self, request: ChatRequest) -> Result<LineStream, LlmError> {
        tracing::debug!(session_id = %request.session_id, "Opening AI chat stream");

        // Only the time to response headers is bounded here; frame gaps are
        // bounded by the consumer.
        let send = self
            .client
            .post(self.url("/chat-stream"))
            .header(header::ACCEPT, "text/event-stream")
            .json(&request)
            .send();

        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| LlmError::Timeout(self.request_timeout))?
            .map_err(|e| self.request_error(e))?;

        let response = ensure_success(response).await?;

        let bytes = response.bytes_stream().map_err(std::io::Error::other);
        let reader = StreamReader::new(bytes);
        let lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES))
            .map_err(|e| LlmError::Stream(e.to_string()));

        Ok(lines.boxed())
    }
}
