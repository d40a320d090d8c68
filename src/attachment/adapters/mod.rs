//! Attachment store adapters.
//!
//! - [`memory::InMemoryAttachmentStore`]: process-local store for tests
//! - [`cache::CachedAttachmentStore`]: download cache in front of any store

pub mod cache;
pub mod memory;
