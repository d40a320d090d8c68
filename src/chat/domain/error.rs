//! Error types for chat domain rules.

use super::{MembershipAction, UserId};
use crate::attachment::domain::AttachmentError;
use thiserror::Error;

/// Violations of conversation membership and role rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversationError {
    /// A direct conversation needs two distinct participants.
    #[error("a direct conversation requires two distinct participants")]
    InvalidDirectParticipants,

    /// Group names must not be blank.
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// The operation only applies to group conversations.
    #[error("operation requires a group conversation")]
    NotAGroup,

    /// The user is not a participant.
    #[error("user {0} is not a participant")]
    NotAParticipant(UserId),

    /// The user is already a participant.
    #[error("user {0} is already a participant")]
    AlreadyParticipant(UserId),

    /// The acting participant's role does not allow the action.
    #[error("user {actor} may not {action}")]
    PermissionDenied {
        /// The participant attempting the action.
        actor: UserId,
        /// The attempted action.
        action: MembershipAction,
    },

    /// The super-admin cannot be removed or demoted.
    #[error("the super-admin cannot be targeted by this action")]
    CannotTargetSuperAdmin,

    /// The target already holds admin rights.
    #[error("user {0} is already an admin")]
    AlreadyAdmin(UserId),

    /// The target holds no admin rights.
    #[error("user {0} is not an admin")]
    NotAnAdmin(UserId),

    /// The super-admin tried to leave without naming a successor.
    #[error("the super-admin must select a successor before leaving")]
    NoSuccessorSelected,

    /// The named successor cannot take over.
    #[error("user {0} cannot become super-admin")]
    InvalidSuccessor(UserId),
}

/// Reasons message content is rejected before any write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageContentError {
    /// Neither body text nor an attachment was supplied.
    #[error("message must have body text or an attachment")]
    EmptyMessage,

    /// The body exceeds the configured limit.
    #[error("message body has {actual} characters, exceeds limit of {max}")]
    BodyTooLong {
        /// The configured limit.
        max: usize,
        /// The actual length.
        actual: usize,
    },

    /// The attachment descriptor is malformed.
    #[error("invalid attachment: {0}")]
    InvalidAttachment(#[from] AttachmentError),
}

/// Error returned while parsing member roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown member role: {0}")]
pub struct ParseMemberRoleError(pub String);
