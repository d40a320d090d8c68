//! Ordered, deduplicated working set of one conversation's messages.

use super::{ConversationId, Message, MessageChange, MessageId, OrderingKey};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// The live messages of one conversation, kept sorted by [`OrderingKey`].
///
/// # Invariants
///
/// - at most one entry per message identifier
/// - iteration order is `(effective timestamp, id)` ascending
/// - once deleted, an identifier is never reinstated by a late redelivery
///
/// # Examples
///
/// ```
/// use colloquy::chat::domain::{ConversationId, MessageSet};
///
/// let set = MessageSet::new(ConversationId::new());
/// assert!(set.snapshot().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MessageSet {
    conversation_id: ConversationId,
    messages: HashMap<MessageId, Message>,
    order: BTreeSet<OrderingKey>,
    deleted: HashSet<MessageId>,
    revision: u64,
}

impl MessageSet {
    /// Creates an empty working set.
    #[must_use]
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            messages: HashMap::new(),
            order: BTreeSet::new(),
            deleted: HashSet::new(),
            revision: 0,
        }
    }

    /// Returns the conversation this set tracks.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the number of live messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no messages are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns how many deleted identifiers are currently suppressed.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.deleted.len()
    }

    /// Returns the number of applied changes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies one change. Returns `true` if the visible sequence changed.
    ///
    /// Changes for other conversations, identical redeliveries, and changes
    /// to deleted identifiers are ignored.
    pub fn apply(&mut self, change: MessageChange) -> bool {
        let changed = match change {
            MessageChange::Inserted(message) | MessageChange::Updated(message) => {
                self.upsert(message)
            }
            MessageChange::Deleted(id) => self.remove(id),
        };
        if changed {
            self.revision = self.revision.saturating_add(1);
        }
        changed
    }

    /// Replaces the live messages with `messages`, as after re-attaching to
    /// a store.
    ///
    /// Deletions seen earlier still suppress the deleted identifiers if the
    /// fresh contents carry them. Tombstones for identifiers absent from
    /// `messages` are dropped, so tombstones are bounded by the deletions
    /// seen since the last reset.
    pub fn reset(&mut self, messages: impl IntoIterator<Item = Message>) {
        let fresh: Vec<Message> = messages.into_iter().collect();
        self.deleted
            .retain(|id| fresh.iter().any(|message| message.id() == *id));
        self.messages.clear();
        self.order.clear();
        for message in fresh {
            self.upsert(message);
        }
        self.revision = self.revision.saturating_add(1);
    }

    /// Returns the current ordered sequence.
    #[must_use]
    pub fn snapshot(&self) -> MessageSetSnapshot {
        let messages: Vec<Message> = self
            .order
            .iter()
            .filter_map(|key| self.messages.get(&key.id).cloned())
            .collect();
        MessageSetSnapshot {
            conversation_id: self.conversation_id,
            revision: self.revision,
            messages: Arc::from(messages),
        }
    }

    fn upsert(&mut self, message: Message) -> bool {
        if message.conversation_id() != self.conversation_id
            || self.deleted.contains(&message.id())
        {
            return false;
        }
        let key = message.ordering_key();
        match self.messages.insert(message.id(), message) {
            Some(previous) if previous.ordering_key() == key => {
                self.messages.get(&key.id) != Some(&previous)
            }
            Some(previous) => {
                self.order.remove(&previous.ordering_key());
                self.order.insert(key);
                true
            }
            None => {
                self.order.insert(key);
                true
            }
        }
    }

    fn remove(&mut self, id: MessageId) -> bool {
        self.deleted.insert(id);
        match self.messages.remove(&id) {
            Some(previous) => {
                self.order.remove(&previous.ordering_key());
                true
            }
            None => false,
        }
    }
}

/// Immutable, cheaply cloneable view of a [`MessageSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSetSnapshot {
    conversation_id: ConversationId,
    revision: u64,
    messages: Arc<[Message]>,
}

impl MessageSetSnapshot {
    /// An empty snapshot at revision zero.
    #[must_use]
    pub fn empty(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            revision: 0,
            messages: Arc::from(Vec::new()),
        }
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the working-set revision this snapshot was taken at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the ordered messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the ordered message identifiers.
    #[must_use]
    pub fn ids(&self) -> Vec<MessageId> {
        self.messages.iter().map(Message::id).collect()
    }

    /// Returns the message with `id`, if live.
    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id() == id)
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the snapshot holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns how many messages still await their server timestamp.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|message| message.is_pending()).count()
    }
}
