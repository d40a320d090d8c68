//! Domain types for conversations and messages.
//!
//! Pure types with no infrastructure dependencies: identifiers, the
//! conversation aggregate with its group role rules, messages and their
//! timestamps, and the ordered working set the synchroniser maintains.

mod change;
mod conversation;
mod delivery;
mod error;
mod ids;
mod message;
mod message_set;
mod role;
mod timestamp;

pub use change::MessageChange;
pub use conversation::{
    Conversation, ConversationKind, ConversationPreview, GroupRoles, LeaveOutcome,
    ParticipantProfile,
};
pub use delivery::DeliveryStatus;
pub use error::{ConversationError, MessageContentError, ParseMemberRoleError};
pub use ids::{ConversationId, MessageId, UserId};
pub use message::{Message, MessageContent, NewMessage, OrderingKey};
pub use message_set::{MessageSet, MessageSetSnapshot};
pub use role::{MemberRole, MembershipAction};
pub use timestamp::{MessageTimestamp, TimestampSource};
