//! Shared configuration, error handling, and extractors for Compass
//!
//! This crate provides common functionality used across the Compass backend:
//! - Configuration management following 12-factor principles
//! - The application error taxonomy and its HTTP mapping
//! - Request extractors
//! - State machine error types

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{not_blank, ValidatedJson};
pub use state::StateError;
