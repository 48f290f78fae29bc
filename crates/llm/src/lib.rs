//! Compass AI Service Client
//!
//! Talks to the external AI chat service with support for:
//! - Request/response chat completion (`/chat`)
//! - Live event-stream chat (`/chat-stream`), decoded into classified frames
//! - Mock service with scripted streams for testing and development

use std::time::Duration;

use futures::stream::BoxStream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod frame;
pub mod http;
pub mod mock;

pub use frame::{decode_frames, FrameKind, StreamFrame};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("AI service configuration error: {0}")]
    Configuration(String),

    #[error("AI service request failed: {0}")]
    Request(String),

    #[error("AI service response error: {0}")]
    Response(String),

    #[error("AI service timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI service returned no content")]
    EmptyResponse,

    #[error("AI service stream interrupted: {0}")]
    Stream(String),
}

impl From<LlmError> for compass_common::Error {
    fn from(err: LlmError) -> Self {
        compass_common::Error::UpstreamUnavailable(err.to_string())
    }
}

/// User profile forwarded to the AI service.
///
/// Personal fields are `None` unless the user agreed to share them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: Option<String>,
    pub residence: Option<String>,
    pub age: Option<i32>,
    pub salary: Option<Decimal>,
    pub assets: Option<Decimal>,
    pub note: Option<String>,
    pub agree_privacy: bool,
}

/// Chat request body for both `/chat` and `/chat-stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub session_id: String,
    pub user_profile: UserProfile,
}

/// Response body of `/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub search_source: Option<String>,
}

/// Raw upstream event-stream lines, in arrival order
pub type LineStream = BoxStream<'static, Result<String, LlmError>>;

/// AI service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider (http, mock)
    pub provider: String,
    /// Base URL of the AI service, without trailing path
    pub base_url: String,
    /// Timeout for the request/response exchange and for stream headers
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

/// AI service trait for different implementations
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Single request/response exchange
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, LlmError>;

    /// Open the event stream; resolves once the upstream accepted the request.
    ///
    /// Dropping the returned stream closes the upstream connection.
    async fn stream(&self, request: ChatRequest) -> Result<LineStream, LlmError>;
}

/// AI service factory
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create AI service based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP AI service client");
                Ok(Box::new(http::HttpAiService::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock AI service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown AI provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
