//! Adapters for the chat ports.
//!
//! - [`memory::InMemoryMessageStore`]: message documents with live feeds
//! - [`memory::InMemoryConversationStore`]: conversation records
//! - [`memory::InMemoryPresence`]: settable presence signal
//!
//! The in-memory adapters expose fault-injection hooks so tests can exercise
//! outages, reconnection, deferred server timestamps, and redelivery.

pub mod memory;
