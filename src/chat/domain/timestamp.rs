//! Message creation timestamps.
//!
//! A message is stamped with the sender's clock when it is composed. When the
//! store assigns server time, the server value becomes authoritative once it
//! arrives; until then the message is *pending* and orders by client time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the authoritative creation time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// The store assigns the timestamp.
    Server,
    /// The store cannot assign timestamps; the client time is final.
    Client,
}

/// Creation timestamp of a message.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use colloquy::chat::domain::MessageTimestamp;
///
/// let client = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let server = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 2).unwrap();
///
/// let pending = MessageTimestamp::awaiting_server(client);
/// assert!(pending.is_pending());
/// assert_eq!(pending.effective(), client);
///
/// let confirmed = pending.confirm(server);
/// assert!(!confirmed.is_pending());
/// assert_eq!(confirmed.effective(), server);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTimestamp {
    client_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server_at: Option<DateTime<Utc>>,
    source: TimestampSource,
}

impl MessageTimestamp {
    /// A timestamp whose server value has not arrived yet.
    #[must_use]
    pub const fn awaiting_server(client_at: DateTime<Utc>) -> Self {
        Self {
            client_at,
            server_at: None,
            source: TimestampSource::Server,
        }
    }

    /// A timestamp that is final at the client value.
    #[must_use]
    pub const fn client_only(client_at: DateTime<Utc>) -> Self {
        Self {
            client_at,
            server_at: None,
            source: TimestampSource::Client,
        }
    }

    /// Returns a copy carrying the server-assigned time.
    ///
    /// Client-sourced timestamps are returned unchanged.
    #[must_use]
    pub const fn confirm(self, server_at: DateTime<Utc>) -> Self {
        match self.source {
            TimestampSource::Server => Self {
                server_at: Some(server_at),
                ..self
            },
            TimestampSource::Client => self,
        }
    }

    /// Returns the time used for ordering.
    #[must_use]
    pub fn effective(&self) -> DateTime<Utc> {
        self.server_at.unwrap_or(self.client_at)
    }

    /// Returns `true` while a server time is expected but not yet known.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.source, TimestampSource::Server) && self.server_at.is_none()
    }

    /// Returns the sender's clock reading.
    #[must_use]
    pub const fn client_at(&self) -> DateTime<Utc> {
        self.client_at
    }

    /// Returns the server time, if assigned.
    #[must_use]
    pub const fn server_at(&self) -> Option<DateTime<Utc>> {
        self.server_at
    }

    /// Returns the timestamp source.
    #[must_use]
    pub const fn source(&self) -> TimestampSource {
        self.source
    }
}
