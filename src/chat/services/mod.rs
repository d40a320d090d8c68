//! Application services for conversation sync, submission, and membership.

mod directory;
mod interaction;
mod membership;
mod submission;
mod synchronizer;

pub use directory::{ConversationDirectory, DirectoryResult};
pub use interaction::{InteractionResult, MessageInteractionService};
pub use membership::{GroupMembershipService, MembershipResult};
pub use submission::{SubmissionService, SubmitRequest, SubmitResult};
pub use synchronizer::{
    ChannelConsumer, ConversationSynchronizer, SnapshotConsumer, SyncCanceller, SyncHandle,
    SyncUpdate,
};
