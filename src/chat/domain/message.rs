//! Messages, their validated content, and unsaved drafts.
//!
//! A [`NewMessage`] is what the submission pipeline hands to the store; the
//! store assigns the identifier (and, when supported, the server time) and
//! returns the persisted [`Message`].

use super::{ConversationId, MessageContentError, MessageId, MessageTimestamp, UserId};
use crate::attachment::domain::AttachmentDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

const ELLIPSIS: char = '\u{2026}';

/// Validated body text and optional attachment.
///
/// # Invariants
///
/// - the body is trimmed
/// - the body is non-empty unless an attachment is present
///
/// # Examples
///
/// ```
/// use colloquy::chat::domain::{MessageContent, MessageContentError};
///
/// assert!(MessageContent::new("hi", None).is_ok());
/// assert_eq!(
///     MessageContent::new("   ", None),
///     Err(MessageContentError::EmptyMessage)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    body: String,
    attachment: Option<AttachmentDescriptor>,
}

impl MessageContent {
    /// Validates and creates message content.
    ///
    /// # Errors
    ///
    /// Returns [`MessageContentError::EmptyMessage`] when the trimmed body is
    /// empty and there is no attachment, or
    /// [`MessageContentError::InvalidAttachment`] for a malformed descriptor.
    pub fn new(
        body: impl Into<String>,
        attachment: Option<AttachmentDescriptor>,
    ) -> Result<Self, MessageContentError> {
        let text = body.into().trim().to_owned();
        if let Some(descriptor) = &attachment {
            descriptor.validate()?;
        } else if text.is_empty() {
            return Err(MessageContentError::EmptyMessage);
        }
        Ok(Self {
            body: text,
            attachment,
        })
    }

    /// Fails when the body is longer than `max_chars` characters.
    ///
    /// # Errors
    ///
    /// Returns [`MessageContentError::BodyTooLong`].
    pub fn ensure_body_within(&self, max_chars: usize) -> Result<(), MessageContentError> {
        let actual = self.body.chars().count();
        if actual > max_chars {
            return Err(MessageContentError::BodyTooLong {
                max: max_chars,
                actual,
            });
        }
        Ok(())
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the attachment, if any.
    #[must_use]
    pub const fn attachment(&self) -> Option<&AttachmentDescriptor> {
        self.attachment.as_ref()
    }

    /// Returns the conversation preview for this content.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy::attachment::domain::{AttachmentDescriptor, AttachmentKind};
    /// use colloquy::chat::domain::MessageContent;
    ///
    /// let photo =
    ///     AttachmentDescriptor::new(AttachmentKind::Image, "https://x/1.png", "image/png", 10);
    /// let content = MessageContent::new("", Some(photo)).expect("valid content");
    /// assert_eq!(content.preview(80), "Photo");
    /// ```
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.body, self.attachment.as_ref(), max_chars)
    }
}

/// An outgoing message that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Sending participant.
    pub sender_id: UserId,
    /// Validated content.
    pub content: MessageContent,
    /// Creation timestamp as known to the client.
    pub timestamp: MessageTimestamp,
    /// Message this one replies to.
    pub reply_to: Option<MessageId>,
}

/// A persisted message.
///
/// The identifier, conversation, and sender never change after creation.
/// Read markers and reactions are merged in place; the timestamp only gains
/// its server value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    conversation_id: ConversationId,
    sender_id: UserId,
    #[serde(default)]
    body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachment: Option<AttachmentDescriptor>,
    created_at: MessageTimestamp,
    #[serde(default)]
    read_by: BTreeMap<UserId, DateTime<Utc>>,
    #[serde(default)]
    reactions: BTreeMap<String, BTreeSet<UserId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply_to: Option<MessageId>,
}

impl Message {
    /// Materialises a draft under the identifier chosen by the store.
    ///
    /// The sender is recorded as having read their own message.
    #[must_use]
    pub fn from_new(id: MessageId, draft: NewMessage) -> Self {
        let read_at = draft.timestamp.client_at();
        Self {
            id,
            conversation_id: draft.conversation_id,
            read_by: BTreeMap::from([(draft.sender_id.clone(), read_at)]),
            sender_id: draft.sender_id,
            body: draft.content.body,
            attachment: draft.content.attachment,
            created_at: draft.timestamp,
            reactions: BTreeMap::new(),
            reply_to: draft.reply_to,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the owning conversation.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the sender.
    #[must_use]
    pub const fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    /// Returns the body text, which may be empty for attachment messages.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the attachment, if any.
    #[must_use]
    pub const fn attachment(&self) -> Option<&AttachmentDescriptor> {
        self.attachment.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> &MessageTimestamp {
        &self.created_at
    }

    /// Returns `true` while the server timestamp is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.created_at.is_pending()
    }

    /// Returns the read markers.
    #[must_use]
    pub const fn read_by(&self) -> &BTreeMap<UserId, DateTime<Utc>> {
        &self.read_by
    }

    /// Returns `true` if `user` has read this message.
    #[must_use]
    pub fn is_read_by(&self, user: &UserId) -> bool {
        self.read_by.contains_key(user)
    }

    /// Returns reactions keyed by emoji.
    #[must_use]
    pub const fn reactions(&self) -> &BTreeMap<String, BTreeSet<UserId>> {
        &self.reactions
    }

    /// Returns the message this one replies to.
    #[must_use]
    pub const fn reply_to(&self) -> Option<MessageId> {
        self.reply_to
    }

    /// Returns the key this message sorts by.
    #[must_use]
    pub fn ordering_key(&self) -> OrderingKey {
        OrderingKey {
            at: self.created_at.effective(),
            id: self.id,
        }
    }

    /// Returns the conversation preview for this message.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.body, self.attachment.as_ref(), max_chars)
    }

    /// Records the server-assigned creation time.
    pub fn confirm_timestamp(&mut self, server_at: DateTime<Utc>) {
        self.created_at = self.created_at.confirm(server_at);
    }

    /// Records that `reader` read the message at `at`.
    ///
    /// The earliest marker wins. Returns `true` if a marker was added.
    pub fn mark_read(&mut self, reader: &UserId, at: DateTime<Utc>) -> bool {
        if self.read_by.contains_key(reader) {
            return false;
        }
        self.read_by.insert(reader.clone(), at);
        true
    }

    /// Adds or removes `user`'s `emoji` reaction.
    ///
    /// Returns `true` if the reaction is now present.
    pub fn toggle_reaction(&mut self, user: &UserId, emoji: &str) -> bool {
        let reactors = self.reactions.entry(emoji.to_owned()).or_default();
        if reactors.remove(user) {
            if reactors.is_empty() {
                self.reactions.remove(emoji);
            }
            false
        } else {
            reactors.insert(user.clone());
            true
        }
    }
}

/// Deterministic sort key: effective timestamp, then identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderingKey {
    /// Effective creation time.
    pub at: DateTime<Utc>,
    /// Tie-breaking identifier.
    pub id: MessageId,
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn preview_text(body: &str, attachment: Option<&AttachmentDescriptor>, max_chars: usize) -> String {
    let text = body.trim();
    if text.is_empty() {
        return attachment
            .map(|descriptor| descriptor.kind.preview_label().to_owned())
            .unwrap_or_default();
    }
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push(ELLIPSIS);
    truncated
}
