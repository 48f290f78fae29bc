//! Compass application composition root
//!
//! Builds the AI service client from configuration and composes the domain
//! routers into a single application.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use compass_common::Config;
use compass_conversations::ConversationsState;
use compass_llm::{LlmConfig, LlmService, LlmServiceFactory};
use sqlx::PgPool;

/// AI service settings derived from the process configuration
pub fn llm_config(config: &Config) -> LlmConfig {
    LlmConfig {
        provider: config.ai_provider.clone(),
        base_url: config.ai_service_url.clone(),
        request_timeout: Duration::from_secs(config.ai_request_timeout_secs),
        connect_timeout: Duration::from_secs(config.ai_connect_timeout_secs),
    }
}

/// Create the main application router with all routes
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let llm: Arc<dyn LlmService> = Arc::from(LlmServiceFactory::create(llm_config(&config))?);
    Ok(app_with_llm(pool, llm, config.stream_idle_timeout()))
}

/// Compose the router around an already-built AI service client
pub fn app_with_llm(pool: PgPool, llm: Arc<dyn LlmService>, stream_idle_timeout: Duration) -> Router {
    let conversations_state = ConversationsState::new(pool, llm, stream_idle_timeout);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(compass_conversations::routes().with_state(conversations_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
