//! Presence port consumed by delivery-status display.

use crate::chat::domain::UserId;

/// Read-only online/offline signal for users.
pub trait PresenceSource: Send + Sync {
    /// Returns `true` if `user` is currently online.
    fn is_online(&self, user: &UserId) -> bool;
}
