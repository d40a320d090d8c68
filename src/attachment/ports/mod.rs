//! Port trait definitions for attachment storage.

mod store;

pub use store::{AttachmentStore, AttachmentStoreError, AttachmentStoreResult, UploadRequest};
