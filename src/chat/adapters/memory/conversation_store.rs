//! In-memory implementation of the `ConversationStore` port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::chat::{
    domain::{Conversation, ConversationId, ConversationPreview, UserId},
    error::StoreError,
    ports::{ConversationStore, StoreResult},
};

/// In-memory implementation of [`ConversationStore`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
    unavailable: Arc<AtomicBool>,
    reject_previews: Arc<AtomicBool>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored conversations.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations
            .read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns `true` if no conversations are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulates loss (`false`) or recovery (`true`) of the backing service.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Makes preview writes fail while other writes succeed.
    pub fn set_reject_previews(&self, reject: bool) {
        self.reject_previews.store(reject, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory conversation store offline"));
        }
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::unavailable(format!("lock poisoned: {err}"))
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> StoreResult<()> {
        self.ensure_available()?;
        let mut guard = self.conversations.write().map_err(lock_error)?;
        if guard.contains_key(&conversation.id()) {
            return Err(StoreError::Rejected(format!(
                "conversation {} already exists",
                conversation.id()
            )));
        }
        guard.insert(conversation.id(), conversation.clone());
        Ok(())
    }

    async fn find(&self, id: ConversationId) -> StoreResult<Option<Conversation>> {
        self.ensure_available()?;
        let guard = self.conversations.read().map_err(lock_error)?;
        Ok(guard.get(&id).cloned())
    }

    async fn find_direct(
        &self,
        first: &UserId,
        second: &UserId,
    ) -> StoreResult<Option<Conversation>> {
        self.ensure_available()?;
        if first == second {
            return Ok(None);
        }
        let guard = self.conversations.read().map_err(lock_error)?;
        Ok(guard
            .values()
            .find(|conversation| {
                !conversation.is_group()
                    && conversation.is_participant(first)
                    && conversation.is_participant(second)
            })
            .cloned())
    }

    async fn find_for_participant(&self, user: &UserId) -> StoreResult<Vec<Conversation>> {
        self.ensure_available()?;
        let guard = self.conversations.read().map_err(lock_error)?;
        Ok(guard
            .values()
            .filter(|conversation| conversation.is_participant(user))
            .cloned()
            .collect())
    }

    async fn update(&self, conversation: &Conversation) -> StoreResult<()> {
        self.ensure_available()?;
        let mut guard = self.conversations.write().map_err(lock_error)?;
        let existing = guard
            .get_mut(&conversation.id())
            .ok_or_else(|| StoreError::NotFound(conversation.id().to_string()))?;
        let preview = existing.preview();
        *existing = conversation.clone();
        if let Some(current) = preview {
            existing.set_preview(current);
        }
        Ok(())
    }

    async fn update_preview(
        &self,
        id: ConversationId,
        preview: ConversationPreview,
    ) -> StoreResult<()> {
        self.ensure_available()?;
        if self.reject_previews.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!(
                "preview write for conversation {id} refused"
            )));
        }
        let mut guard = self.conversations.write().map_err(lock_error)?;
        let existing = guard
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        existing.set_preview(preview);
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> StoreResult<()> {
        self.ensure_available()?;
        let mut guard = self.conversations.write().map_err(lock_error)?;
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
