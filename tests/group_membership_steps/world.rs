//! Shared world state for group membership BDD scenarios.

use std::sync::Arc;

use colloquy::chat::{
    adapters::memory::InMemoryConversationStore,
    domain::{Conversation, LeaveOutcome},
    error::MembershipError,
    services::{ConversationDirectory, GroupMembershipService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Scenario world for group membership behaviour tests.
pub struct MembershipWorld {
    pub directory: ConversationDirectory<InMemoryConversationStore, DefaultClock>,
    pub membership: GroupMembershipService<InMemoryConversationStore>,
    pub group: Option<Conversation>,
    pub last_change: Option<Result<(), MembershipError>>,
    pub last_leave: Option<LeaveOutcome>,
}

impl MembershipWorld {
    /// Creates a world with an empty conversation store.
    #[must_use]
    pub fn new() -> Self {
        let conversations = Arc::new(InMemoryConversationStore::new());
        Self {
            directory: ConversationDirectory::new(
                Arc::clone(&conversations),
                Arc::new(DefaultClock),
            ),
            membership: GroupMembershipService::new(conversations),
            group: None,
            last_change: None,
            last_leave: None,
        }
    }

    /// Returns the scenario group.
    ///
    /// # Errors
    ///
    /// Returns an error when no group was set up.
    pub fn group(&self) -> eyre::Result<&Conversation> {
        self.group
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing group in scenario world"))
    }
}

impl Default for MembershipWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MembershipWorld {
    MembershipWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
