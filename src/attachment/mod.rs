//! Attachment descriptors, media storage, and the download cache.
//!
//! Messages carry an [`domain::AttachmentDescriptor`]; the bytes live behind
//! the [`ports::AttachmentStore`] port. Repeated downloads are served from a
//! bounded [`adapters::cache::AttachmentCache`].

pub mod adapters;
pub mod domain;
pub mod ports;
