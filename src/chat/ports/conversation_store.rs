//! Conversation store port.

use crate::chat::{
    domain::{Conversation, ConversationId, ConversationPreview, UserId},
    ports::StoreResult,
};
use async_trait::async_trait;

/// Port for conversation record persistence.
///
/// Concurrent writers are resolved last-write-wins per field group: the
/// membership fields written by [`Self::update`] and the preview fields
/// written by [`Self::update_preview`] never overwrite each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Stores a new conversation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Rejected`](crate::chat::error::StoreError::Rejected)
    /// when the identifier already exists.
    async fn create(&self, conversation: &Conversation) -> StoreResult<()>;

    /// Finds a conversation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::chat::error::StoreError) if the lookup fails.
    async fn find(&self, id: ConversationId) -> StoreResult<Option<Conversation>>;

    /// Finds the direct conversation between two distinct users.
    ///
    /// Returns `None` when `first` and `second` are the same user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::chat::error::StoreError) if the lookup fails.
    async fn find_direct(&self, first: &UserId, second: &UserId)
    -> StoreResult<Option<Conversation>>;

    /// Returns every conversation `user` participates in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::chat::error::StoreError) if the query fails.
    async fn find_for_participant(&self, user: &UserId) -> StoreResult<Vec<Conversation>>;

    /// Writes membership, role, and profile fields.
    ///
    /// The whole field group is replaced, so concurrent changes from two
    /// actors are last-write-wins. Preview fields are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::chat::error::StoreError::NotFound)
    /// when the conversation does not exist.
    async fn update(&self, conversation: &Conversation) -> StoreResult<()>;

    /// Writes the denormalised last-message fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::chat::error::StoreError::NotFound)
    /// when the conversation does not exist.
    async fn update_preview(&self, id: ConversationId, preview: ConversationPreview)
    -> StoreResult<()>;

    /// Deletes a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::chat::error::StoreError::NotFound)
    /// when the conversation does not exist.
    async fn delete(&self, id: ConversationId) -> StoreResult<()>;
}
