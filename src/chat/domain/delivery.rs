//! Read and delivery status derived from read markers and presence.

use super::{Conversation, Message, UserId};
use serde::{Deserialize, Serialize};

/// Delivery state of a message as seen by its sender.
///
/// Ordered by progress, so `Read > Delivered > Sent > Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The store has not confirmed the message yet.
    Pending,
    /// Stored, but no recipient is online or has read it.
    Sent,
    /// At least one recipient is online.
    Delivered,
    /// Every recipient has read it.
    Read,
}

impl DeliveryStatus {
    /// Derives the status of `message` within `conversation`.
    ///
    /// `is_online` answers presence for a recipient. Recipients are the
    /// current participants other than the sender.
    #[must_use]
    pub fn derive(
        message: &Message,
        conversation: &Conversation,
        is_online: impl Fn(&UserId) -> bool,
    ) -> Self {
        if message.is_pending() {
            return Self::Pending;
        }
        let recipients: Vec<&UserId> = conversation
            .participants()
            .iter()
            .filter(|user| *user != message.sender_id())
            .collect();
        if !recipients.is_empty() && recipients.iter().all(|user| message.is_read_by(user)) {
            return Self::Read;
        }
        if recipients.iter().any(|user| is_online(user)) {
            return Self::Delivered;
        }
        Self::Sent
    }
}
