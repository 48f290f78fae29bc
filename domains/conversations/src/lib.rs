//! Conversations domain: chat threads, transcripts, and the streaming relay

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, MessageRole, ProfileRecord};
pub use domain::relay::{
    run_relay, spawn_relay, RelayEvent, RelayOutcome, StreamFailure, TranscriptCommitter,
};
pub use domain::state::{StateError, StreamEvent, StreamState, StreamStateMachine};
pub use domain::transcript::{Transcript, TranscriptAccumulator};

// Re-export repository types
pub use repository::{
    ConversationRepository, ConversationsRepositories, MessageRepository, PgTranscriptCommitter,
    UserProfileRepository,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
