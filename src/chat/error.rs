//! Error types for chat persistence and services.
//!
//! Uses `thiserror` for typed variants callers can match on. Store errors
//! wrap foreign errors in an [`Arc`] so they stay cheap to clone when fanned
//! out to subscribers.

use super::domain::{ConversationError, ConversationId, MessageContentError, MessageId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by message and conversation store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store cannot be reached; the operation did not take effect.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The addressed document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Creates an unavailability error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Wraps a backend error.
    #[must_use]
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Arc::new(err))
    }

    /// Returns `true` if retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors returned by the message submission pipeline.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// The content failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] MessageContentError),

    /// The conversation does not exist.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// The sender is not a participant; nothing was written.
    #[error("user {sender} is not a participant of conversation {conversation_id}")]
    NotAParticipant {
        /// The target conversation.
        conversation_id: ConversationId,
        /// The rejected sender.
        sender: UserId,
    },

    /// The reply reference does not name a message in the conversation.
    #[error("reply target {0} is not a message in this conversation")]
    InvalidReply(MessageId),

    /// The store is unreachable; the message was not persisted and the
    /// caller may retry.
    #[error("message not sent: {0}")]
    StoreUnavailable(StoreError),

    /// The store failed for a non-transient reason.
    #[error("message not sent: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        if err.is_transient() {
            Self::StoreUnavailable(err)
        } else {
            Self::Store(err)
        }
    }
}

/// Errors surfaced by the conversation synchroniser.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The conversation does not exist or is not accessible.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// The viewer is not a participant.
    #[error("user {viewer} may not read conversation {conversation_id}")]
    PermissionDenied {
        /// The conversation requested.
        conversation_id: ConversationId,
        /// The rejected viewer.
        viewer: UserId,
    },

    /// A recoverable feed failure; the last good snapshot is retained.
    #[error("synchronisation interrupted: {0}")]
    Transient(StoreError),

    /// The store failed while attaching.
    #[error("failed to attach to message store: {0}")]
    Store(StoreError),
}

/// Errors returned by group membership operations.
#[derive(Debug, Clone, Error)]
pub enum MembershipError {
    /// The conversation does not exist.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// A membership or role rule was violated.
    #[error(transparent)]
    Domain(#[from] ConversationError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors returned by read-marker, reaction, and delete operations.
#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    /// The message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The owning conversation does not exist.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// The user is not a participant of the owning conversation.
    #[error(transparent)]
    Domain(#[from] ConversationError),

    /// Only the sender may delete a message.
    #[error("user {0} may not delete this message")]
    NotTheSender(UserId),

    /// The reaction emoji is blank.
    #[error("reaction must not be empty")]
    EmptyReaction,

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
