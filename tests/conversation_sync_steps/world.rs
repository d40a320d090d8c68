//! Shared world state for conversation synchronisation BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use colloquy::chat::{
    adapters::memory::{InMemoryConversationStore, InMemoryMessageStore},
    domain::{Conversation, Message, MessageSetSnapshot},
    error::{SubmitError, SyncError},
    services::{
        ConversationDirectory, ConversationSynchronizer, SubmissionService, SyncHandle, SyncUpdate,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::sync::mpsc::UnboundedReceiver;

/// How long a step waits for a subscription update.
const WAIT: Duration = Duration::from_secs(2);

/// Submission service type used by the BDD world.
pub type TestSubmissionService =
    SubmissionService<InMemoryMessageStore, InMemoryConversationStore, DefaultClock>;

/// Scenario world for conversation synchronisation behaviour tests.
pub struct SyncWorld {
    pub messages: Arc<InMemoryMessageStore>,
    pub directory: ConversationDirectory<InMemoryConversationStore, DefaultClock>,
    pub submission: TestSubmissionService,
    pub synchronizer: ConversationSynchronizer<InMemoryMessageStore, InMemoryConversationStore>,
    pub conversation: Option<Conversation>,
    pub subscription: Option<(SyncHandle, UnboundedReceiver<SyncUpdate>)>,
    pub subscribe_result: Option<Result<(), SyncError>>,
    pub sent: Vec<Message>,
    pub last_submit_error: Option<SubmitError>,
    pub interruptions: Vec<(SyncError, MessageSetSnapshot)>,
}

impl SyncWorld {
    /// Creates a world backed by fresh in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let messages = Arc::new(InMemoryMessageStore::new());
        let conversations = Arc::new(InMemoryConversationStore::new());
        Self {
            directory: ConversationDirectory::new(
                Arc::clone(&conversations),
                Arc::new(DefaultClock),
            ),
            submission: SubmissionService::new(
                Arc::clone(&messages),
                Arc::clone(&conversations),
                Arc::new(DefaultClock),
            ),
            synchronizer: ConversationSynchronizer::new(Arc::clone(&messages), conversations),
            messages,
            conversation: None,
            subscription: None,
            subscribe_result: None,
            sent: Vec::new(),
            last_submit_error: None,
            interruptions: Vec::new(),
        }
    }

    /// Returns the scenario conversation.
    ///
    /// # Errors
    ///
    /// Returns an error when no conversation was set up.
    pub fn conversation(&self) -> eyre::Result<&Conversation> {
        self.conversation
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing conversation in scenario world"))
    }

    /// Waits for a snapshot holding `count` messages.
    ///
    /// Error updates received on the way are recorded as interruptions.
    ///
    /// # Errors
    ///
    /// Returns an error when there is no subscription, the stream closes, or
    /// no matching snapshot arrives in time.
    pub async fn snapshot_with(&mut self, count: usize) -> eyre::Result<MessageSetSnapshot> {
        let (_, updates) = self
            .subscription
            .as_mut()
            .ok_or_else(|| eyre::eyre!("missing subscription in scenario world"))?;
        loop {
            match tokio::time::timeout(WAIT, updates.recv()).await? {
                Some(SyncUpdate::Snapshot(snapshot)) if snapshot.len() == count => {
                    return Ok(snapshot);
                }
                Some(SyncUpdate::Snapshot(_)) => {}
                Some(SyncUpdate::Error { error, last_good }) => {
                    self.interruptions.push((error, last_good));
                }
                None => return Err(eyre::eyre!("subscription closed")),
            }
        }
    }
}

impl Default for SyncWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SyncWorld {
    SyncWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
