//! Read markers, reactions, deletion, and delivery status.

use crate::chat::{
    domain::{Conversation, DeliveryStatus, Message, MessageId, MessageSetSnapshot, UserId},
    error::InteractionError,
    ports::{ConversationStore, MessagePatch, MessageStore, PresenceSource},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Result type for interaction operations.
pub type InteractionResult<T> = Result<T, InteractionError>;

/// Operations participants perform on existing messages.
#[derive(Clone)]
pub struct MessageInteractionService<M, C, P, K>
where
    M: MessageStore,
    C: ConversationStore,
    P: PresenceSource,
    K: Clock + Send + Sync,
{
    messages: Arc<M>,
    conversations: Arc<C>,
    presence: Arc<P>,
    clock: Arc<K>,
}

impl<M, C, P, K> MessageInteractionService<M, C, P, K>
where
    M: MessageStore,
    C: ConversationStore,
    P: PresenceSource,
    K: Clock + Send + Sync,
{
    /// Creates an interaction service.
    #[must_use]
    pub const fn new(
        messages: Arc<M>,
        conversations: Arc<C>,
        presence: Arc<P>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            messages,
            conversations,
            presence,
            clock,
        }
    }

    /// Records that `reader` has read a message. The first read time is
    /// kept on repeat calls.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::MessageNotFound`] for unknown messages and
    /// [`InteractionError::Domain`] when `reader` is not a participant.
    pub async fn mark_read(
        &self,
        message_id: MessageId,
        reader: &UserId,
    ) -> InteractionResult<Message> {
        let (message, _) = self.load_for(message_id, reader).await?;
        if message.is_read_by(reader) {
            return Ok(message);
        }
        let patch = MessagePatch::MarkRead {
            reader: reader.clone(),
            at: self.clock.utc(),
        };
        Ok(self.messages.update(message_id, patch).await?)
    }

    /// Marks every message in `snapshot` as read by `reader`.
    ///
    /// Returns the number of messages newly marked.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`Self::mark_read`]; earlier markers stay
    /// written.
    pub async fn mark_all_read(
        &self,
        snapshot: &MessageSetSnapshot,
        reader: &UserId,
    ) -> InteractionResult<usize> {
        let mut marked = 0;
        for message in snapshot.messages().iter().filter(|m| !m.is_read_by(reader)) {
            self.mark_read(message.id(), reader).await?;
            marked += 1;
        }
        debug!(
            conversation_id = %snapshot.conversation_id(),
            reader = %reader,
            marked,
            "messages marked read"
        );
        Ok(marked)
    }

    /// Adds `user`'s `emoji` reaction, or removes it if already present.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::EmptyReaction`] for a blank emoji and
    /// [`InteractionError::Domain`] when `user` is not a participant.
    pub async fn toggle_reaction(
        &self,
        message_id: MessageId,
        user: &UserId,
        emoji: &str,
    ) -> InteractionResult<Message> {
        let reaction = emoji.trim();
        if reaction.is_empty() {
            return Err(InteractionError::EmptyReaction);
        }
        self.load_for(message_id, user).await?;
        let patch = MessagePatch::ToggleReaction {
            user: user.clone(),
            emoji: reaction.to_owned(),
        };
        Ok(self.messages.update(message_id, patch).await?)
    }

    /// Deletes a message. Only its sender may do this.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::NotTheSender`] for anyone else.
    pub async fn delete_message(
        &self,
        message_id: MessageId,
        requester: &UserId,
    ) -> InteractionResult<()> {
        let message = self.find_message(message_id).await?;
        if message.sender_id() != requester {
            return Err(InteractionError::NotTheSender(requester.clone()));
        }
        self.messages.delete(message_id).await?;
        info!(%message_id, conversation_id = %message.conversation_id(), "message deleted");
        Ok(())
    }

    /// Returns the delivery status of a message as its sender sees it.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::MessageNotFound`] or
    /// [`InteractionError::ConversationNotFound`] for missing records.
    pub async fn delivery_status(
        &self,
        message_id: MessageId,
    ) -> InteractionResult<DeliveryStatus> {
        let message = self.find_message(message_id).await?;
        let conversation = self.find_conversation(&message).await?;
        Ok(DeliveryStatus::derive(&message, &conversation, |user| {
            self.presence.is_online(user)
        }))
    }

    async fn load_for(
        &self,
        message_id: MessageId,
        user: &UserId,
    ) -> InteractionResult<(Message, Conversation)> {
        let message = self.find_message(message_id).await?;
        let conversation = self.find_conversation(&message).await?;
        conversation.require_participant(user)?;
        Ok((message, conversation))
    }

    async fn find_message(&self, message_id: MessageId) -> InteractionResult<Message> {
        self.messages
            .find(message_id)
            .await?
            .ok_or(InteractionError::MessageNotFound(message_id))
    }

    async fn find_conversation(&self, message: &Message) -> InteractionResult<Conversation> {
        let conversation_id = message.conversation_id();
        self.conversations
            .find(conversation_id)
            .await?
            .ok_or(InteractionError::ConversationNotFound(conversation_id))
    }
}
