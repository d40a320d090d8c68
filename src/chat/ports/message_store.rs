//! Message store port: durable storage plus live change feeds.

use crate::chat::{
    domain::{ConversationId, Message, MessageChange, MessageId, NewMessage, UserId},
    error::StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A partial update to a persisted message.
///
/// Patches only touch mergeable fields; identity, sender, conversation, and
/// content are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePatch {
    /// Adds a read marker for `reader` unless one exists.
    MarkRead {
        /// The reading participant.
        reader: UserId,
        /// When the message was read.
        at: DateTime<Utc>,
    },
    /// Adds or removes `user`'s reaction.
    ToggleReaction {
        /// The reacting participant.
        user: UserId,
        /// The reaction emoji.
        emoji: String,
    },
}

impl MessagePatch {
    /// Applies the patch, returning `true` if the message changed.
    pub fn apply_to(&self, message: &mut Message) -> bool {
        match self {
            Self::MarkRead { reader, at } => message.mark_read(reader, *at),
            Self::ToggleReaction { user, emoji } => {
                message.toggle_reaction(user, emoji);
                true
            }
        }
    }
}

/// An event delivered on a subscription feed.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A message document changed.
    Change(MessageChange),
    /// The feed was interrupted; later events may follow after
    /// [`FeedEvent::Reconnected`].
    Error(StoreError),
    /// The store re-established connectivity. Subscribers should re-attach
    /// to pick up changes missed while disconnected.
    Reconnected,
}

/// A live subscription to one conversation's messages.
///
/// Dropping the feed releases the subscription.
#[derive(Debug)]
pub struct MessageFeed {
    /// Messages present when the subscription was opened.
    pub initial: Vec<Message>,
    /// Subsequent events in delivery order.
    pub events: mpsc::UnboundedReceiver<FeedEvent>,
}

/// Port for message persistence and change notification.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - identifiers are assigned by the store and never reused
/// - change events are delivered at least once, in commit order per feed
/// - sender, conversation, and content are immutable after creation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Returns `true` if the store assigns creation timestamps itself.
    fn supports_server_timestamps(&self) -> bool;

    /// Persists a new message and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the write did not happen.
    async fn create(&self, draft: NewMessage) -> StoreResult<Message>;

    /// Applies a partial update and returns the updated message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the message does not exist.
    async fn update(&self, id: MessageId, patch: MessagePatch) -> StoreResult<Message>;

    /// Retrieves a message by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn find(&self, id: MessageId) -> StoreResult<Option<Message>>;

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the message does not exist.
    async fn delete(&self, id: MessageId) -> StoreResult<()>;

    /// Opens a live subscription to the messages of a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot be reached.
    async fn subscribe(&self, conversation_id: ConversationId) -> StoreResult<MessageFeed>;
}
