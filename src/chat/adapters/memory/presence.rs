//! In-memory presence signal.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::chat::{domain::UserId, ports::PresenceSource};

/// Presence source backed by a set of online users.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPresence {
    online: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryPresence {
    /// Creates a presence source with everyone offline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `user` online or offline.
    pub fn set_online(&self, user: &UserId, online: bool) {
        let mut guard = self.online.write().unwrap_or_else(PoisonError::into_inner);
        if online {
            guard.insert(user.clone());
        } else {
            guard.remove(user);
        }
    }
}

impl PresenceSource for InMemoryPresence {
    fn is_online(&self, user: &UserId) -> bool {
        self.online
            .read()
            .map(|guard| guard.contains(user))
            .unwrap_or(false)
    }
}
