//! Group membership and role transitions.
//!
//! Each operation loads the conversation, applies the transition on the
//! aggregate, and writes the membership fields back. Rejected transitions
//! never reach the store.

use crate::chat::{
    domain::{Conversation, ConversationError, ConversationId, LeaveOutcome, UserId},
    error::MembershipError,
    ports::ConversationStore,
};
use std::sync::Arc;
use tracing::info;

/// Result type for membership operations.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Applies role and membership transitions to group conversations.
#[derive(Clone)]
pub struct GroupMembershipService<C>
where
    C: ConversationStore,
{
    conversations: Arc<C>,
}

impl<C> GroupMembershipService<C>
where
    C: ConversationStore,
{
    /// Creates a membership service.
    #[must_use]
    pub const fn new(conversations: Arc<C>) -> Self {
        Self { conversations }
    }

    /// Grants admin rights to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] unless `actor` is the super-admin
    /// and `target` is a non-admin participant.
    pub async fn promote_admin(
        &self,
        conversation_id: ConversationId,
        actor: &UserId,
        target: &UserId,
    ) -> MembershipResult<Conversation> {
        let group = self
            .transition(conversation_id, |group| group.promote(actor, target))
            .await?;
        info!(%conversation_id, actor = %actor, target = %target, "admin promoted");
        Ok(group)
    }

    /// Revokes admin rights from `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] unless `actor` is the super-admin
    /// and `target` is an admin other than the super-admin.
    pub async fn demote_admin(
        &self,
        conversation_id: ConversationId,
        actor: &UserId,
        target: &UserId,
    ) -> MembershipResult<Conversation> {
        let group = self
            .transition(conversation_id, |group| group.demote(actor, target))
            .await?;
        info!(%conversation_id, actor = %actor, target = %target, "admin demoted");
        Ok(group)
    }

    /// Adds `target` to the group.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] unless `actor` is an admin and
    /// `target` is not yet a participant.
    pub async fn add_member(
        &self,
        conversation_id: ConversationId,
        actor: &UserId,
        target: &UserId,
    ) -> MembershipResult<Conversation> {
        let group = self
            .transition(conversation_id, |group| group.add_member(actor, target))
            .await?;
        info!(%conversation_id, actor = %actor, target = %target, "member added");
        Ok(group)
    }

    /// Removes `target` from the group.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] unless `actor` is an admin and
    /// `target` is a participant other than the super-admin.
    pub async fn remove_member(
        &self,
        conversation_id: ConversationId,
        actor: &UserId,
        target: &UserId,
    ) -> MembershipResult<Conversation> {
        let group = self
            .transition(conversation_id, |group| group.remove_member(actor, target))
            .await?;
        info!(%conversation_id, actor = %actor, target = %target, "member removed");
        Ok(group)
    }

    /// Hands the super-admin role to `successor`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] unless `actor` is the super-admin
    /// and `successor` is another participant.
    pub async fn transfer_super_admin(
        &self,
        conversation_id: ConversationId,
        actor: &UserId,
        successor: &UserId,
    ) -> MembershipResult<Conversation> {
        let group = self
            .transition(conversation_id, |group| {
                group.transfer_super_admin(actor, successor)
            })
            .await?;
        info!(%conversation_id, from = %actor, to = %successor, "super-admin transferred");
        Ok(group)
    }

    /// Removes `user` from the group at their own request.
    ///
    /// A departing super-admin must name a `successor` while other members
    /// remain. When the last participant leaves, the group is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] with
    /// [`ConversationError::NoSuccessorSelected`] when a super-admin leaves
    /// without a successor; the group is unchanged in that case.
    pub async fn leave_group(
        &self,
        conversation_id: ConversationId,
        user: &UserId,
        successor: Option<&UserId>,
    ) -> MembershipResult<LeaveOutcome> {
        let mut group = self.load(conversation_id).await?;
        let outcome = group.leave(user, successor)?;
        match outcome {
            LeaveOutcome::Left => {
                self.conversations.update(&group).await?;
                info!(%conversation_id, user = %user, "member left group");
            }
            LeaveOutcome::Emptied => {
                self.conversations.delete(conversation_id).await?;
                info!(%conversation_id, user = %user, "last member left; group deleted");
            }
        }
        Ok(outcome)
    }

    async fn load(&self, conversation_id: ConversationId) -> MembershipResult<Conversation> {
        self.conversations
            .find(conversation_id)
            .await?
            .ok_or(MembershipError::ConversationNotFound(conversation_id))
    }

    async fn transition<F>(
        &self,
        conversation_id: ConversationId,
        apply: F,
    ) -> MembershipResult<Conversation>
    where
        F: FnOnce(&mut Conversation) -> Result<(), ConversationError> + Send,
    {
        let mut group = self.load(conversation_id).await?;
        apply(&mut group)?;
        self.conversations.update(&group).await?;
        Ok(group)
    }
}
