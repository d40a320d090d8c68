//! Port trait definitions for the chat subsystem.
//!
//! Ports are the contracts the chat core needs from a backend: a document
//! store for messages with live subscriptions, a store for conversation
//! records, and a read-only presence signal.

pub mod conversation_store;
pub mod message_store;
pub mod presence;

pub use conversation_store::ConversationStore;
pub use message_store::{FeedEvent, MessageFeed, MessagePatch, MessageStore, StoreResult};
pub use presence::PresenceSource;

#[cfg(test)]
pub use conversation_store::MockConversationStore;
#[cfg(test)]
pub use message_store::MockMessageStore;
