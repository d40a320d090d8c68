//! In-memory adapter implementations.
//!
//! Thread-safe and dependency-free; suitable for tests and local
//! prototyping, not for production.

mod conversation_store;
mod message_store;
mod presence;

pub use conversation_store::InMemoryConversationStore;
pub use message_store::{InMemoryMessageStore, ServerTimestampMode};
pub use presence::InMemoryPresence;
