//! Conversation creation, lookup, and listing.

use crate::chat::{
    domain::{Conversation, ConversationError, ConversationId, ParticipantProfile, UserId},
    error::MembershipError,
    ports::ConversationStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, MembershipError>;

/// Opens, creates, and lists conversations.
#[derive(Clone)]
pub struct ConversationDirectory<C, K>
where
    C: ConversationStore,
    K: Clock + Send + Sync,
{
    conversations: Arc<C>,
    clock: Arc<K>,
}

impl<C, K> ConversationDirectory<C, K>
where
    C: ConversationStore,
    K: Clock + Send + Sync,
{
    /// Creates a directory over `conversations`.
    #[must_use]
    pub const fn new(conversations: Arc<C>, clock: Arc<K>) -> Self {
        Self {
            conversations,
            clock,
        }
    }

    /// Returns the direct conversation between `user` and `peer`, creating
    /// it on first contact.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] when `user` and `peer` are the
    /// same, or [`MembershipError::Store`] when persistence fails.
    pub async fn open_direct(&self, user: &UserId, peer: &UserId) -> DirectoryResult<Conversation> {
        if user == peer {
            return Err(ConversationError::InvalidDirectParticipants.into());
        }
        if let Some(existing) = self.conversations.find_direct(user, peer).await? {
            return Ok(existing);
        }
        let conversation = Conversation::direct(user, peer, &*self.clock)?;
        self.conversations.create(&conversation).await?;
        info!(
            conversation_id = %conversation.id(),
            user = %user,
            peer = %peer,
            "direct conversation opened"
        );
        Ok(conversation)
    }

    /// Creates a group with `creator` as super-admin.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] for a blank name, or
    /// [`MembershipError::Store`] when persistence fails.
    pub async fn create_group(
        &self,
        creator: &UserId,
        name: &str,
        members: impl IntoIterator<Item = UserId> + Send,
    ) -> DirectoryResult<Conversation> {
        let group = Conversation::group(creator, name, members, &*self.clock)?;
        self.conversations.create(&group).await?;
        info!(
            conversation_id = %group.id(),
            creator = %creator,
            participants = group.participants().len(),
            "group created"
        );
        Ok(group)
    }

    /// Finds a conversation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::ConversationNotFound`] when it does not
    /// exist.
    pub async fn find(&self, conversation_id: ConversationId) -> DirectoryResult<Conversation> {
        self.conversations
            .find(conversation_id)
            .await?
            .ok_or(MembershipError::ConversationNotFound(conversation_id))
    }

    /// Lists `user`'s conversations, most recent activity first.
    ///
    /// Conversations without messages sort by creation time; ties break on
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Store`] when the query fails.
    pub async fn list_for(&self, user: &UserId) -> DirectoryResult<Vec<Conversation>> {
        let mut conversations = self.conversations.find_for_participant(user).await?;
        conversations.sort_by(|left, right| {
            right
                .activity_at()
                .cmp(&left.activity_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(conversations)
    }

    /// Sets `user`'s own display metadata in a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] when `user` is not a participant.
    pub async fn set_profile(
        &self,
        conversation_id: ConversationId,
        user: &UserId,
        profile: ParticipantProfile,
    ) -> DirectoryResult<Conversation> {
        let mut conversation = self.find(conversation_id).await?;
        conversation.set_profile(user, profile)?;
        self.conversations.update(&conversation).await?;
        Ok(conversation)
    }
}
