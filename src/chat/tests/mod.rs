//! Unit tests for the chat module.
//!
//! Tests are organised by concern: domain rules first, then each service
//! against the in-memory adapters.
