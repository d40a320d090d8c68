//! Domain types for attachments.

mod descriptor;
mod error;
mod kind;

pub use descriptor::AttachmentDescriptor;
pub use error::{AttachmentError, ParseAttachmentKindError};
pub use kind::AttachmentKind;
