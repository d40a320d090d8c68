//! Live, ordered view of one conversation's messages.
//!
//! Each subscription owns one tokio task that drains the store feed strictly
//! in arrival order, so merges never interleave. Snapshots are pushed to a
//! [`SnapshotConsumer`] through a delivery gate: no callback starts once the
//! subscription is cancelled.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chat::{
    domain::{ConversationId, MessageSet, MessageSetSnapshot, UserId},
    error::SyncError,
    ports::{ConversationStore, FeedEvent, MessageFeed, MessageStore},
};

/// Receiver of synchroniser output.
///
/// Callbacks run on the subscription task and must not block.
pub trait SnapshotConsumer: Send + Sync {
    /// Called with the full ordered sequence after every visible change.
    fn on_snapshot(&self, snapshot: &MessageSetSnapshot);

    /// Called when the feed is interrupted. `last_good` is the latest
    /// snapshot, which stays valid until the next `on_snapshot`.
    fn on_error(&self, error: &SyncError, last_good: &MessageSetSnapshot);
}

/// One item of synchroniser output, for stream-style consumption.
#[derive(Debug, Clone)]
pub enum SyncUpdate {
    /// A new ordered snapshot.
    Snapshot(MessageSetSnapshot),
    /// A recoverable interruption.
    Error {
        /// What went wrong.
        error: SyncError,
        /// The snapshot that remains current.
        last_good: MessageSetSnapshot,
    },
}

/// [`SnapshotConsumer`] that forwards updates into a channel.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    sender: mpsc::UnboundedSender<SyncUpdate>,
}

impl ChannelConsumer {
    /// Creates a consumer and the receiving end of its stream.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SyncUpdate>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn forward(&self, update: SyncUpdate) {
        if self.sender.send(update).is_err() {
            debug!("sync update receiver dropped");
        }
    }
}

impl SnapshotConsumer for ChannelConsumer {
    fn on_snapshot(&self, snapshot: &MessageSetSnapshot) {
        self.forward(SyncUpdate::Snapshot(snapshot.clone()));
    }

    fn on_error(&self, error: &SyncError, last_good: &MessageSetSnapshot) {
        self.forward(SyncUpdate::Error {
            error: error.clone(),
            last_good: last_good.clone(),
        });
    }
}

#[derive(Debug, Default)]
struct GateState {
    cancelled: bool,
    delivering: Option<ThreadId>,
}

/// Cancellation flag plus in-flight tracking for consumer callbacks.
///
/// Cancelling from another thread waits for a running callback to finish;
/// cancelling from inside a callback returns immediately.
#[derive(Debug, Default)]
struct DeliveryGate {
    state: Mutex<GateState>,
    idle: Condvar,
    wakeup: Notify,
}

impl DeliveryGate {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Runs `callback` unless cancelled. Returns `false` if skipped.
    fn deliver(&self, callback: impl FnOnce()) -> bool {
        {
            let mut state = self.lock();
            if state.cancelled {
                return false;
            }
            state.delivering = Some(thread::current().id());
        }
        let _in_flight = InFlight(self);
        callback();
        true
    }

    fn cancel(&self) {
        let current = thread::current().id();
        let mut state = self.lock();
        state.cancelled = true;
        self.wakeup.notify_one();
        while state.delivering.is_some_and(|owner| owner != current) {
            state = self
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    async fn cancelled(&self) {
        if !self.is_cancelled() {
            self.wakeup.notified().await;
        }
    }
}

/// Clears the in-flight marker even if the callback panics.
struct InFlight<'a>(&'a DeliveryGate);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().delivering = None;
        self.0.idle.notify_all();
    }
}

/// Cloneable cancellation token for a subscription.
///
/// Safe to use from inside a consumer callback.
#[derive(Debug, Clone)]
pub struct SyncCanceller {
    gate: Arc<DeliveryGate>,
}

impl SyncCanceller {
    /// Stops further callbacks. No callback starts after this returns.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// Returns `true` once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.gate.is_cancelled()
    }
}

/// Handle to a live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SyncHandle {
    conversation_id: ConversationId,
    gate: Arc<DeliveryGate>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Returns the subscribed conversation.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns a token that can cancel this subscription from elsewhere,
    /// including from inside a callback.
    #[must_use]
    pub fn canceller(&self) -> SyncCanceller {
        SyncCanceller {
            gate: Arc::clone(&self.gate),
        }
    }

    /// Returns `true` until the subscription is cancelled or its feed ends.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.gate.is_cancelled() && !self.task.is_finished()
    }

    /// Releases the store subscription. No callback starts after this
    /// returns.
    pub fn unsubscribe(&self) {
        self.gate.cancel();
        self.task.abort();
        debug!(conversation_id = %self.conversation_id, "conversation sync detached");
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Maintains live, ordered views of conversations.
///
/// # Example
///
/// ```ignore
/// let sync = ConversationSynchronizer::new(message_store, conversation_store);
/// let (handle, mut updates) = sync.subscribe_channel(conversation_id, &viewer).await?;
/// while let Some(SyncUpdate::Snapshot(snapshot)) = updates.recv().await {
///     render(snapshot.messages());
/// }
/// handle.unsubscribe();
/// ```
#[derive(Clone)]
pub struct ConversationSynchronizer<M, C>
where
    M: MessageStore + 'static,
    C: ConversationStore,
{
    messages: Arc<M>,
    conversations: Arc<C>,
}

impl<M, C> ConversationSynchronizer<M, C>
where
    M: MessageStore + 'static,
    C: ConversationStore,
{
    /// Creates a synchroniser over the given stores.
    #[must_use]
    pub const fn new(messages: Arc<M>, conversations: Arc<C>) -> Self {
        Self {
            messages,
            conversations,
        }
    }

    /// Opens a live view of `conversation_id` for `viewer`.
    ///
    /// Returns once the store subscription is registered; snapshots arrive
    /// asynchronously, starting with the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ConversationNotFound`] for unknown
    /// conversations, [`SyncError::PermissionDenied`] when `viewer` is not a
    /// participant, and [`SyncError::Store`] when the store cannot attach.
    pub async fn subscribe(
        &self,
        conversation_id: ConversationId,
        viewer: &UserId,
        consumer: Arc<dyn SnapshotConsumer>,
    ) -> Result<SyncHandle, SyncError> {
        let conversation = self
            .conversations
            .find(conversation_id)
            .await
            .map_err(SyncError::Store)?
            .ok_or(SyncError::ConversationNotFound(conversation_id))?;
        if !conversation.is_participant(viewer) {
            return Err(SyncError::PermissionDenied {
                conversation_id,
                viewer: viewer.clone(),
            });
        }

        let feed = self
            .messages
            .subscribe(conversation_id)
            .await
            .map_err(SyncError::Store)?;
        let gate = Arc::new(DeliveryGate::default());
        let worker = SyncWorker {
            store: Arc::clone(&self.messages),
            set: MessageSet::new(conversation_id),
            consumer,
            gate: Arc::clone(&gate),
        };
        let task = tokio::spawn(worker.run(feed));
        info!(%conversation_id, viewer = %viewer, "conversation sync attached");

        Ok(SyncHandle {
            conversation_id,
            gate,
            task,
        })
    }

    /// Opens a live view whose updates are delivered as a stream.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::subscribe`].
    pub async fn subscribe_channel(
        &self,
        conversation_id: ConversationId,
        viewer: &UserId,
    ) -> Result<(SyncHandle, mpsc::UnboundedReceiver<SyncUpdate>), SyncError> {
        let (consumer, updates) = ChannelConsumer::channel();
        let handle = self
            .subscribe(conversation_id, viewer, Arc::new(consumer))
            .await?;
        Ok((handle, updates))
    }
}

struct SyncWorker<M>
where
    M: MessageStore,
{
    store: Arc<M>,
    set: MessageSet,
    consumer: Arc<dyn SnapshotConsumer>,
    gate: Arc<DeliveryGate>,
}

impl<M> SyncWorker<M>
where
    M: MessageStore,
{
    async fn run(mut self, feed: MessageFeed) {
        let mut events = self.attach(feed);
        loop {
            let next = tokio::select! {
                () = self.gate.cancelled() => break,
                event = events.recv() => event,
            };
            if self.gate.is_cancelled() {
                break;
            }
            match next {
                None => {
                    debug!(conversation_id = %self.set.conversation_id(), "message feed closed");
                    break;
                }
                Some(FeedEvent::Change(change)) => {
                    if self.set.apply(change) {
                        self.publish();
                    }
                }
                Some(FeedEvent::Error(err)) => {
                    warn!(
                        conversation_id = %self.set.conversation_id(),
                        error = %err,
                        "message feed interrupted"
                    );
                    self.report(&SyncError::Transient(err));
                }
                Some(FeedEvent::Reconnected) => {
                    match self.store.subscribe(self.set.conversation_id()).await {
                        Ok(feed) => {
                            info!(
                                conversation_id = %self.set.conversation_id(),
                                "conversation sync re-attached"
                            );
                            events = self.attach(feed);
                        }
                        Err(err) => self.report(&SyncError::Transient(err)),
                    }
                }
            }
        }
    }

    fn attach(&mut self, feed: MessageFeed) -> mpsc::UnboundedReceiver<FeedEvent> {
        self.set.reset(feed.initial);
        self.publish();
        feed.events
    }

    fn publish(&self) {
        let snapshot = self.set.snapshot();
        self.gate.deliver(|| self.consumer.on_snapshot(&snapshot));
    }

    fn report(&self, error: &SyncError) {
        let last_good = self.set.snapshot();
        self.gate.deliver(|| self.consumer.on_error(error, &last_good));
    }
}
