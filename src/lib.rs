//! Colloquy: real-time conversation sync core.
//!
//! This crate provides the client-side core of a chat application backed by
//! a document store with live change feeds: ordered conversation views that
//! tolerate pending server timestamps and duplicate delivery, a validating
//! message submission pipeline, and group membership with a three-tier role
//! model.
//!
//! # Architecture
//!
//! Colloquy follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for stores and presence
//! - **Adapters**: Concrete implementations of ports (in-memory, cache)
//!
//! # Modules
//!
//! - [`chat`]: Conversations, messages, synchronisation, and membership
//! - [`attachment`]: Attachment descriptors, media storage, and caching
//! - [`config`]: Runtime limits loaded from JSON
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod attachment;
pub mod chat;
pub mod config;
