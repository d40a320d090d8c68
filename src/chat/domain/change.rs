//! Change notifications emitted by a message store subscription.

use super::{Message, MessageId};

/// A single change to a message document.
///
/// Stores deliver changes at least once, so consumers must treat repeated
/// inserts and updates for the same identifier as replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageChange {
    /// A message was created.
    Inserted(Message),
    /// A message's mutable fields changed.
    Updated(Message),
    /// A message was deleted.
    Deleted(MessageId),
}

impl MessageChange {
    /// Returns the identifier of the affected message.
    #[must_use]
    pub const fn message_id(&self) -> MessageId {
        match self {
            Self::Inserted(message) | Self::Updated(message) => message.id(),
            Self::Deleted(id) => *id,
        }
    }
}
