//! Attachment descriptors carried on messages.

use super::{AttachmentError, AttachmentKind};
use serde::{Deserialize, Serialize};

/// Metadata describing an uploaded attachment.
///
/// The descriptor is what a message stores; the bytes themselves live in an
/// [`AttachmentStore`](crate::attachment::ports::AttachmentStore).
///
/// # Examples
///
/// ```
/// use colloquy::attachment::domain::{AttachmentDescriptor, AttachmentKind};
///
/// let photo = AttachmentDescriptor::new(
///     AttachmentKind::Image,
///     "https://cdn.example.com/p/1.png",
///     "image/png",
///     2048,
/// )
/// .with_dimensions(640, 480);
/// assert!(photo.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    /// The media category.
    pub kind: AttachmentKind,
    /// Remote URL the attachment is served from.
    pub url: String,
    /// The original MIME type.
    pub mime_type: String,
    /// Size of the attachment in bytes.
    pub byte_size: u64,
    /// Pixel width for images and videos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Pixel height for images and videos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Playback duration in milliseconds for audio and video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl AttachmentDescriptor {
    /// Creates a descriptor with the required fields.
    #[must_use]
    pub fn new(
        kind: AttachmentKind,
        url: impl Into<String>,
        mime_type: impl Into<String>,
        byte_size: u64,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            mime_type: mime_type.into(),
            byte_size,
            width: None,
            height: None,
            duration_ms: None,
        }
    }

    /// Sets the pixel dimensions.
    #[must_use]
    pub const fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the playback duration.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Checks the descriptor is usable as message content.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] when the URL or MIME type is blank, the
    /// size is zero, or only one pixel dimension is present.
    pub fn validate(&self) -> Result<(), AttachmentError> {
        if self.url.trim().is_empty() {
            return Err(AttachmentError::MissingUrl);
        }
        if self.mime_type.trim().is_empty() {
            return Err(AttachmentError::MissingMimeType);
        }
        if self.byte_size == 0 {
            return Err(AttachmentError::EmptyPayload);
        }
        if self.width.is_some() != self.height.is_some() {
            return Err(AttachmentError::PartialDimensions);
        }
        Ok(())
    }
}
