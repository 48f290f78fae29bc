//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_AI_SERVICE_URL: &str = "http://ai-service:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// AI service
    pub ai_provider: String,
    pub ai_service_url: String,
    pub ai_request_timeout_secs: u64,
    pub ai_connect_timeout_secs: u64,
    pub ai_stream_idle_timeout_secs: u64,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    #[mutants::skip] // Reads process environment; exercised by the local binary
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            ai_provider: env::var("AI_PROVIDER").unwrap_or_else(|_| "http".to_string()),
            ai_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_SERVICE_URL.to_string()),
            ai_request_timeout_secs: secs_var("AI_REQUEST_TIMEOUT_SECS", 60),
            ai_connect_timeout_secs: secs_var("AI_CONNECT_TIMEOUT_SECS", 10),
            ai_stream_idle_timeout_secs: secs_var("AI_STREAM_IDLE_TIMEOUT_SECS", 60),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "compass=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }

    /// Maximum wait for the next upstream frame before a stream is failed
    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_stream_idle_timeout_secs)
    }
}

fn secs_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
