//! Message submission pipeline.
//!
//! Validation and participation checks run before anything is written, so a
//! rejected submission leaves no trace in the store.

use crate::attachment::domain::AttachmentDescriptor;
use crate::chat::{
    domain::{
        ConversationId, ConversationPreview, Message, MessageContent, MessageId,
        MessageTimestamp, NewMessage, UserId,
    },
    error::SubmitError,
    ports::{ConversationStore, MessageStore},
};
use crate::config::SubmissionConfig;
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Request payload for sending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    conversation_id: ConversationId,
    sender: UserId,
    body: String,
    attachment: Option<AttachmentDescriptor>,
    reply_to: Option<MessageId>,
}

impl SubmitRequest {
    /// Creates an empty request from `sender` to `conversation_id`.
    #[must_use]
    pub const fn new(conversation_id: ConversationId, sender: UserId) -> Self {
        Self {
            conversation_id,
            sender,
            body: String::new(),
            attachment: None,
            reply_to: None,
        }
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Attaches an already uploaded file.
    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Marks the message as a reply.
    #[must_use]
    pub const fn with_reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Result type for submission operations.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Validates and persists outgoing messages.
#[derive(Clone)]
pub struct SubmissionService<M, C, K>
where
    M: MessageStore,
    C: ConversationStore,
    K: Clock + Send + Sync,
{
    messages: Arc<M>,
    conversations: Arc<C>,
    clock: Arc<K>,
    config: SubmissionConfig,
}

impl<M, C, K> SubmissionService<M, C, K>
where
    M: MessageStore,
    C: ConversationStore,
    K: Clock + Send + Sync,
{
    /// Creates a service with default limits.
    #[must_use]
    pub fn new(messages: Arc<M>, conversations: Arc<C>, clock: Arc<K>) -> Self {
        Self {
            messages,
            conversations,
            clock,
            config: SubmissionConfig::default(),
        }
    }

    /// Replaces the submission limits.
    #[must_use]
    pub const fn with_config(mut self, config: SubmissionConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active limits.
    #[must_use]
    pub const fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Validates and persists a message, then refreshes the conversation
    /// preview.
    ///
    /// The returned message carries a pending timestamp when the store
    /// assigns server time asynchronously. A failed preview refresh is
    /// logged and does not fail the submission.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Validation`] for empty or oversized content,
    /// [`SubmitError::NotAParticipant`] for outsiders,
    /// [`SubmitError::InvalidReply`] for a reply to a message elsewhere, and
    /// [`SubmitError::StoreUnavailable`] when the write did not happen and
    /// may be retried.
    pub async fn submit(&self, request: SubmitRequest) -> SubmitResult<Message> {
        let content = MessageContent::new(request.body, request.attachment)?;
        content.ensure_body_within(self.config.max_body_chars)?;

        let conversation_id = request.conversation_id;
        let conversation = self
            .conversations
            .find(conversation_id)
            .await?
            .ok_or(SubmitError::ConversationNotFound(conversation_id))?;
        if !conversation.is_participant(&request.sender) {
            return Err(SubmitError::NotAParticipant {
                conversation_id,
                sender: request.sender,
            });
        }
        if let Some(target) = request.reply_to {
            self.ensure_reply_target(conversation_id, target).await?;
        }

        let client_at = self.clock.utc();
        let timestamp = if self.messages.supports_server_timestamps() {
            MessageTimestamp::awaiting_server(client_at)
        } else {
            MessageTimestamp::client_only(client_at)
        };
        let message = self
            .messages
            .create(NewMessage {
                conversation_id,
                sender_id: request.sender,
                content,
                timestamp,
                reply_to: request.reply_to,
            })
            .await?;
        debug!(
            %conversation_id,
            message_id = %message.id(),
            pending = message.is_pending(),
            "message submitted"
        );

        self.refresh_preview(&message).await;
        Ok(message)
    }

    async fn ensure_reply_target(
        &self,
        conversation_id: ConversationId,
        target: MessageId,
    ) -> SubmitResult<()> {
        match self.messages.find(target).await? {
            Some(original) if original.conversation_id() == conversation_id => Ok(()),
            _ => Err(SubmitError::InvalidReply(target)),
        }
    }

    async fn refresh_preview(&self, message: &Message) {
        let preview = ConversationPreview {
            text: message.preview(self.config.preview_max_chars),
            at: message.created_at().effective(),
        };
        if let Err(err) = self
            .conversations
            .update_preview(message.conversation_id(), preview)
            .await
        {
            warn!(
                conversation_id = %message.conversation_id(),
                message_id = %message.id(),
                error = %err,
                "failed to refresh conversation preview"
            );
        }
    }
}
