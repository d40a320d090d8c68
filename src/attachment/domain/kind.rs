//! Attachment kinds and their display labels.

use super::ParseAttachmentKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The broad media category of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// A still image.
    Image,
    /// A video clip.
    Video,
    /// A generic file.
    File,
    /// An audio recording.
    Audio,
}

impl AttachmentKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
            Self::Audio => "audio",
        }
    }

    /// Returns the label shown in conversation previews when a message has
    /// no body text.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy::attachment::domain::AttachmentKind;
    ///
    /// assert_eq!(AttachmentKind::Image.preview_label(), "Photo");
    /// ```
    #[must_use]
    pub const fn preview_label(self) -> &'static str {
        match self {
            Self::Image => "Photo",
            Self::Video => "Video",
            Self::File => "File",
            Self::Audio => "Audio",
        }
    }

    /// Infers the kind from a MIME type, defaulting to [`Self::File`].
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy::attachment::domain::AttachmentKind;
    ///
    /// assert_eq!(AttachmentKind::from_mime_type("image/png"), AttachmentKind::Image);
    /// assert_eq!(AttachmentKind::from_mime_type("application/pdf"), AttachmentKind::File);
    /// ```
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Self {
        let normalized = mime_type.trim().to_ascii_lowercase();
        match normalized.split('/').next() {
            Some("image") => Self::Image,
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            _ => Self::File,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AttachmentKind {
    type Error = ParseAttachmentKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "file" => Ok(Self::File),
            "audio" => Ok(Self::Audio),
            _ => Err(ParseAttachmentKindError(value.to_owned())),
        }
    }
}
