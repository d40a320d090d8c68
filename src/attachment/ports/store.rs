//! Attachment store port for uploading and fetching media.

use crate::attachment::domain::{AttachmentDescriptor, AttachmentKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for attachment store operations.
pub type AttachmentStoreResult<T> = Result<T, AttachmentStoreError>;

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
    /// Pixel dimensions when known by the client.
    pub dimensions: Option<(u32, u32)>,
    /// Playback duration when known by the client.
    pub duration_ms: Option<u64>,
}

impl UploadRequest {
    /// Creates an upload request for the given file.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
            dimensions: None,
            duration_ms: None,
        }
    }

    /// Sets the pixel dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Sets the playback duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Returns the attachment kind implied by the MIME type.
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_mime_type(&self.mime_type)
    }
}

/// Media storage contract (a CDN-backed object store in production).
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Uploads a file and returns the descriptor to attach to a message.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::Rejected`] for empty uploads and
    /// [`AttachmentStoreError::Unavailable`] when the store cannot be reached.
    async fn upload(&self, request: UploadRequest) -> AttachmentStoreResult<AttachmentDescriptor>;

    /// Downloads the bytes served at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentStoreError::NotFound`] when nothing is stored at
    /// the URL.
    async fn download(&self, url: &str) -> AttachmentStoreResult<Arc<[u8]>>;
}

/// Errors returned by attachment store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttachmentStoreError {
    /// Nothing is stored at the URL.
    #[error("attachment not found: {0}")]
    NotFound(String),

    /// The upload was refused.
    #[error("attachment rejected: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("attachment store unavailable: {0}")]
    Unavailable(String),
}
