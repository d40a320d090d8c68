//! Error types for attachment descriptors.

use thiserror::Error;

/// Reasons an attachment descriptor is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttachmentError {
    /// The remote URL is blank.
    #[error("attachment URL must not be empty")]
    MissingUrl,

    /// The MIME type is blank.
    #[error("attachment MIME type must not be empty")]
    MissingMimeType,

    /// The attachment reports zero bytes.
    #[error("attachment must not be empty")]
    EmptyPayload,

    /// Only one of width and height was supplied.
    #[error("attachment dimensions require both width and height")]
    PartialDimensions,
}

/// Error returned while parsing attachment kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown attachment kind: {0}")]
pub struct ParseAttachmentKindError(pub String);
