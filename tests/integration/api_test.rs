//! API endpoint integration tests
//!
//! HTTP-level tests for the chat and conversation endpoints. They need a
//! Postgres database (`TEST_DATABASE_URL`) and are ignored by default:
//! `cargo test -p compass-integration-tests -- --ignored`

#![allow(dead_code)]

mod chat;
mod common;
mod conversations;
