//! Domain layer: entities, invariants, and the streaming relay

pub mod access;
pub mod entities;
pub mod relay;
pub mod state;
pub mod title;
pub mod transcript;
