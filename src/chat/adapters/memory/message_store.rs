//! In-memory implementation of the `MessageStore` port.
//!
//! Every subscriber receives its own unbounded channel. Events are sent while
//! the state lock is held, so each feed observes commits in order.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::mpsc;

use crate::chat::{
    domain::{ConversationId, Message, MessageChange, MessageId, NewMessage},
    error::StoreError,
    ports::{FeedEvent, MessageFeed, MessagePatch, MessageStore, StoreResult},
};

/// How the store assigns creation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerTimestampMode {
    /// The server time is assigned as part of `create`.
    #[default]
    Immediate,
    /// Messages are inserted pending; the server time arrives as a later
    /// update via [`InMemoryMessageStore::resolve_pending_timestamps`].
    Deferred,
    /// The store cannot assign timestamps.
    Unsupported,
}

struct Subscriber {
    conversation_id: ConversationId,
    sender: mpsc::UnboundedSender<FeedEvent>,
}

#[derive(Default)]
struct StoreState {
    messages: HashMap<MessageId, Message>,
    created: Vec<MessageId>,
    subscribers: Vec<Subscriber>,
    unavailable: bool,
    disconnected: bool,
    creates: usize,
}

impl StoreState {
    fn publish(&mut self, conversation_id: ConversationId, event: &FeedEvent) {
        if self.disconnected {
            return;
        }
        self.subscribers.retain(|subscriber| {
            subscriber.conversation_id != conversation_id
                || subscriber.sender.send(event.clone()).is_ok()
        });
    }

    fn publish_all(&mut self, event: &FeedEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.sender.send(event.clone()).is_ok());
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::unavailable("in-memory message store offline"));
        }
        Ok(())
    }
}

/// In-memory implementation of [`MessageStore`].
///
/// # Example
///
/// ```
/// use colloquy::chat::adapters::memory::{InMemoryMessageStore, ServerTimestampMode};
/// use colloquy::chat::ports::MessageStore;
///
/// let store = InMemoryMessageStore::new().with_mode(ServerTimestampMode::Unsupported);
/// assert!(!store.supports_server_timestamps());
/// ```
#[derive(Clone)]
pub struct InMemoryMessageStore {
    state: Arc<RwLock<StoreState>>,
    clock: Arc<dyn Clock + Send + Sync>,
    mode: ServerTimestampMode,
}

impl fmt::Debug for InMemoryMessageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMessageStore")
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageStore {
    /// Creates an empty store that assigns server time immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock: Arc::new(DefaultClock),
            mode: ServerTimestampMode::Immediate,
        }
    }

    /// Uses `clock` as the server clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets how server timestamps are assigned.
    #[must_use]
    pub const fn with_mode(mut self, mode: ServerTimestampMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the number of stored messages.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|guard| guard.messages.len()).unwrap_or(0)
    }

    /// Returns `true` if no messages are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many `create` calls succeeded.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.state.read().map(|guard| guard.creates).unwrap_or(0)
    }

    /// Returns the number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state
            .read()
            .map(|guard| {
                guard
                    .subscribers
                    .iter()
                    .filter(|subscriber| !subscriber.sender.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Makes reads and writes fail (`false`) or succeed again (`true`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn set_available(&self, available: bool) -> StoreResult<()> {
        self.write()?.unavailable = !available;
        Ok(())
    }

    /// Drops connectivity to subscribers: each feed receives an error and
    /// no further changes until [`Self::reconnect`].
    ///
    /// Writes keep succeeding, as they would from other clients.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn disconnect(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        state.publish_all(&FeedEvent::Error(StoreError::unavailable(
            "subscription connection lost",
        )));
        state.disconnected = true;
        Ok(())
    }

    /// Restores connectivity and signals [`FeedEvent::Reconnected`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn reconnect(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        state.disconnected = false;
        state.publish_all(&FeedEvent::Reconnected);
        Ok(())
    }

    /// Assigns server time to every pending message in creation order,
    /// publishing updates.
    ///
    /// Returns the number of messages confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn resolve_pending_timestamps(&self) -> StoreResult<usize> {
        let mut guard = self.write()?;
        let state = &mut *guard;
        let mut confirmed = Vec::new();
        for id in &state.created {
            if let Some(message) = state.messages.get_mut(id)
                && message.is_pending()
            {
                message.confirm_timestamp(self.clock.utc());
                confirmed.push(message.clone());
            }
        }
        let count = confirmed.len();
        for message in confirmed {
            let conversation_id = message.conversation_id();
            state.publish(
                conversation_id,
                &FeedEvent::Change(MessageChange::Updated(message)),
            );
        }
        Ok(count)
    }

    /// Publishes the current version of a message again as an insert,
    /// as an at-least-once transport may.
    ///
    /// Returns `false` if the message does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the internal lock is poisoned.
    pub fn redeliver(&self, id: MessageId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(message) = state.messages.get(&id).cloned() else {
            return Ok(false);
        };
        state.publish(
            message.conversation_id(),
            &FeedEvent::Change(MessageChange::Inserted(message)),
        );
        Ok(true)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| StoreError::unavailable(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    fn supports_server_timestamps(&self) -> bool {
        self.mode != ServerTimestampMode::Unsupported
    }

    async fn create(&self, draft: NewMessage) -> StoreResult<Message> {
        let mut state = self.write()?;
        state.ensure_available()?;

        let mut message = Message::from_new(MessageId::new(), draft);
        if self.mode == ServerTimestampMode::Immediate {
            message.confirm_timestamp(self.clock.utc());
        }
        state.messages.insert(message.id(), message.clone());
        state.created.push(message.id());
        state.creates = state.creates.saturating_add(1);
        state.publish(
            message.conversation_id(),
            &FeedEvent::Change(MessageChange::Inserted(message.clone())),
        );
        Ok(message)
    }

    async fn update(&self, id: MessageId, patch: MessagePatch) -> StoreResult<Message> {
        let mut state = self.write()?;
        state.ensure_available()?;

        let message = state
            .messages
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !patch.apply_to(message) {
            return Ok(message.clone());
        }
        let updated = message.clone();
        state.publish(
            updated.conversation_id(),
            &FeedEvent::Change(MessageChange::Updated(updated.clone())),
        );
        Ok(updated)
    }

    async fn find(&self, id: MessageId) -> StoreResult<Option<Message>> {
        let state = self
            .state
            .read()
            .map_err(|e| StoreError::unavailable(format!("lock poisoned: {e}")))?;
        state.ensure_available()?;
        Ok(state.messages.get(&id).cloned())
    }

    async fn delete(&self, id: MessageId) -> StoreResult<()> {
        let mut state = self.write()?;
        state.ensure_available()?;

        let removed = state
            .messages
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        state.created.retain(|created| *created != id);
        state.publish(
            removed.conversation_id(),
            &FeedEvent::Change(MessageChange::Deleted(id)),
        );
        Ok(())
    }

    async fn subscribe(&self, conversation_id: ConversationId) -> StoreResult<MessageFeed> {
        let mut state = self.write()?;
        state.ensure_available()?;

        let mut initial: Vec<Message> = state
            .messages
            .values()
            .filter(|message| message.conversation_id() == conversation_id)
            .cloned()
            .collect();
        initial.sort_by_key(Message::ordering_key);

        let (sender, events) = mpsc::unbounded_channel();
        state.subscribers.push(Subscriber {
            conversation_id,
            sender,
        });
        Ok(MessageFeed { initial, events })
    }
}
