//! Conversations, messages, and their live synchronisation.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//!
//! Three services carry the core behaviour: the
//! [`services::ConversationSynchronizer`] keeps an ordered, deduplicated view
//! of a conversation current; the [`services::SubmissionService`] validates
//! and writes outgoing messages; and the [`services::GroupMembershipService`]
//! enforces group role transitions.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
